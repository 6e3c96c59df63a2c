use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use anyhow::Result;

use nyafind_types::{Accuracy, SearchCriteria, TorrentResult};

use crate::parse;
use crate::query::{batch_query, movie_query, single_query};

use super::{sort_by_seeders, Source};

fn default_url() -> String {
    "https://nyaaapi.onrender.com/nyaa".to_string()
}

fn default_trust() -> Accuracy {
    Accuracy::Low
}

/// Envelope shape the mirror API uses; the field mapping drift between
/// revisions is absorbed with serde aliases.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiRevision {
    /// entries wrapped in `{ "torrents": [...] }`
    V1,
    /// bare top-level array
    V2,
}

impl Default for ApiRevision {
    fn default() -> Self {
        ApiRevision::V1
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NyaaApiConfig {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default)]
    revision: ApiRevision,
    /// mirror APIs can't vouch for index authority
    #[serde(default = "default_trust")]
    trust: Accuracy,
}

impl Default for NyaaApiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            revision: ApiRevision::default(),
            trust: default_trust(),
        }
    }
}

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    torrents: Vec<ApiTorrent>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ApiTorrent {
    #[serde(alias = "name")]
    title: String,
    #[serde(alias = "magnet_uri")]
    magnet: String,
    link: String,
    hash: String,
    category: String,
    size: serde_json::Value,
    seeders: u64,
    leechers: u64,
    #[serde(alias = "completed")]
    downloads: u64,
    date: String,
}

fn map_size(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(x) => parse::parse_size(x),
        serde_json::Value::Number(x) => x.as_u64(),
        _ => None,
    }
}

fn map_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S %z"))
        .ok()
}

fn map_entry(entry: ApiTorrent, batch: bool, trust: Accuracy) -> TorrentResult {
    let link = if entry.magnet.is_empty() {
        entry.link
    } else {
        entry.magnet
    };
    let hash = if entry.hash.is_empty() {
        parse::extract_hash(&link)
    } else {
        Some(entry.hash.to_ascii_lowercase())
    };
    let category = if entry.category.is_empty() {
        None
    } else {
        Some(entry.category)
    };

    let title_batch = entry.title.to_lowercase().contains("batch");
    TorrentResult {
        accuracy: if title_batch { Accuracy::High } else { trust },
        batch: batch || title_batch,
        title: entry.title,
        link,
        hash,
        size: map_size(&entry.size),
        date: map_date(&entry.date),
        seeders: entry.seeders,
        leechers: entry.leechers,
        downloads: entry.downloads,
        category,
        trusted: false,
    }
}

pub struct NyaaApiClient {
    client: reqwest::Client,
    config: NyaaApiConfig,
}

impl NyaaApiClient {
    pub fn new(config: NyaaApiConfig) -> Self {
        Self {
            client: reqwest::ClientBuilder::default()
                .build()
                .expect("failed to make client"),
            config,
        }
    }

    async fn fetch_text(&self, url: String) -> Result<String> {
        debug!("fetching nyaa api: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            bail!("bad http status code for nyaa api: {}", response.status());
        }
        Ok(response.text().await?)
    }

    fn parse_entries(&self, body: &str) -> Result<Vec<ApiTorrent>> {
        Ok(match self.config.revision {
            ApiRevision::V1 => serde_json::from_str::<ApiEnvelope>(body)?.torrents,
            ApiRevision::V2 => serde_json::from_str(body)?,
        })
    }

    async fn search(&self, query: &str, batch: bool) -> Result<Vec<TorrentResult>> {
        let url = format!("{}?q={}", self.config.url, urlencoding::encode(query));
        let body = self.fetch_text(url).await?;
        let mut results: Vec<TorrentResult> = self
            .parse_entries(&body)?
            .into_iter()
            .map(|entry| map_entry(entry, batch, self.config.trust))
            .collect();
        sort_by_seeders(&mut results);
        debug!("nyaa api returned {} results for {:?}", results.len(), query);
        Ok(results)
    }

    /// Direct lookup of one entry by its backend identifier, bypassing
    /// search entirely. Only this backend exposes a by-id endpoint.
    pub async fn single_by_id(&self, id: &str) -> Result<TorrentResult> {
        if id.is_empty() {
            bail!("no torrent id provided");
        }
        let url = format!("{}/id/{}", self.config.url, urlencoding::encode(id));
        let body = self.fetch_text(url).await?;
        let entry: ApiTorrent = serde_json::from_str(&body)?;
        Ok(map_entry(entry, false, self.config.trust))
    }
}

#[async_trait::async_trait]
impl Source for NyaaApiClient {
    async fn single(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        self.search(&single_query(criteria)?, false).await
    }

    async fn batch(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        self.search(&batch_query(criteria)?, true).await
    }

    async fn movie(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        self.search(&movie_query(criteria)?, false).await
    }

    async fn test(&self) -> bool {
        match self.client.get(self.config.url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_BODY: &str = r#"{
        "torrents": [
            {
                "name": "[Example] Some Show - 05 (1080p).mkv",
                "magnet": "magnet:?xt=urn:btih:ABCDEF0123456789ABCDEF0123456789ABCDEF01&dn=some-show",
                "size": "1.5 GiB",
                "seeders": 10,
                "leechers": 3,
                "completed": 120,
                "category": "Anime - English-translated",
                "date": "2023-09-01T12:00:00+00:00"
            },
            {
                "name": "[Example] Some Show [Batch] 01-12",
                "magnet": "",
                "link": "https://nyaa.si/download/101.torrent",
                "size": "no size",
                "seeders": 50,
                "leechers": 2,
                "completed": 9,
                "date": "not a date"
            }
        ]
    }"#;

    const V2_BODY: &str = r#"[
        {
            "title": "[Example] Some Show - 05 (1080p).mkv",
            "magnet_uri": "magnet:?xt=urn:btih:ABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "hash": "ABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "size": 1610612736,
            "seeders": 10,
            "leechers": 3,
            "downloads": 120
        }
    ]"#;

    fn client(revision: ApiRevision) -> NyaaApiClient {
        NyaaApiClient::new(NyaaApiConfig {
            revision,
            ..Default::default()
        })
    }

    #[test]
    fn test_v1_envelope() {
        let entries = client(ApiRevision::V1).parse_entries(V1_BODY).unwrap();
        assert_eq!(entries.len(), 2);

        let result = map_entry(entries.into_iter().next().unwrap(), false, Accuracy::Low);
        assert_eq!(result.title, "[Example] Some Show - 05 (1080p).mkv");
        assert!(result.link.starts_with("magnet:"));
        assert_eq!(
            result.hash.as_deref(),
            Some("abcdef0123456789abcdef0123456789abcdef01")
        );
        assert_eq!(result.size, Some(1_610_612_736));
        assert_eq!(result.seeders, 10);
        assert_eq!(result.downloads, 120);
        assert_eq!(
            result.category.as_deref(),
            Some("Anime - English-translated")
        );
        assert!(result.date.is_some());
        assert_eq!(result.accuracy, Accuracy::Low);
    }

    #[test]
    fn test_v1_lenient_fields() {
        let entries = client(ApiRevision::V1).parse_entries(V1_BODY).unwrap();
        let result = map_entry(entries.into_iter().nth(1).unwrap(), false, Accuracy::Low);
        // unparseable size and date degrade instead of aborting the set
        assert_eq!(result.size, None);
        assert_eq!(result.date, None);
        assert_eq!(result.link, "https://nyaa.si/download/101.torrent");
        assert_eq!(result.hash, None);
        assert_eq!(result.accuracy, Accuracy::High);
        assert!(result.batch);
    }

    #[test]
    fn test_v2_bare_array() {
        let entries = client(ApiRevision::V2).parse_entries(V2_BODY).unwrap();
        assert_eq!(entries.len(), 1);

        let result = map_entry(entries.into_iter().next().unwrap(), false, Accuracy::Low);
        assert_eq!(result.title, "[Example] Some Show - 05 (1080p).mkv");
        assert_eq!(
            result.hash.as_deref(),
            Some("abcdef0123456789abcdef0123456789abcdef01")
        );
        // numeric sizes are byte counts already
        assert_eq!(result.size, Some(1_610_612_736));
        assert_eq!(result.downloads, 120);
    }

    #[test]
    fn test_revision_envelope_mismatch() {
        assert!(client(ApiRevision::V2).parse_entries(V1_BODY).is_err());
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let client = client(ApiRevision::V1);
        assert!(client.single_by_id("").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_criteria_rejected() {
        let client = client(ApiRevision::V1);
        assert!(client.single(&SearchCriteria::default()).await.is_err());
    }
}

use std::collections::BTreeMap;
use std::io::BufReader;

use chrono::DateTime;
use rss::extension::Extension;
use rss::{Channel, Item};
use serde::{Deserialize, Serialize};

use anyhow::Result;

use nyafind_types::{Accuracy, SearchCriteria, TorrentResult};

use crate::parse;
use crate::query::{batch_query, movie_query, single_query};

use super::{sort_by_seeders, Source};

fn default_url() -> String {
    "https://nyaa.si/?page=rss&c=0_0&f=0&q=".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NyaaConfig {
    #[serde(default = "default_url")]
    url: String,
    /// CORS-bypass proxy prefix; the full feed URL is appended
    /// percent-encoded
    #[serde(default)]
    proxy: Option<String>,
    /// trust override; defaults to medium direct, low when proxied
    #[serde(default)]
    trust: Option<Accuracy>,
}

impl Default for NyaaConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            proxy: None,
            trust: None,
        }
    }
}

impl NyaaConfig {
    fn trust(&self) -> Accuracy {
        self.trust.unwrap_or(if self.proxy.is_some() {
            Accuracy::Low
        } else {
            Accuracy::Medium
        })
    }
}

pub struct NyaaClient {
    client: reqwest::Client,
    config: NyaaConfig,
}

impl NyaaClient {
    pub fn new(config: NyaaConfig) -> Self {
        Self {
            client: reqwest::ClientBuilder::default()
                .build()
                .expect("failed to make client"),
            config,
        }
    }

    fn feed_url(&self, query: &str) -> String {
        let url = format!("{}{}", self.config.url, urlencoding::encode(query));
        match &self.config.proxy {
            Some(proxy) => format!("{}{}", proxy, urlencoding::encode(&url)),
            None => url,
        }
    }

    async fn fetch(&self, query: &str) -> Result<Channel> {
        let url = self.feed_url(query);
        debug!("fetching nyaa feed: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            bail!("bad http status code for nyaa: {}", response.status());
        }
        let body = response.text().await?;
        Ok(Channel::read_from(BufReader::new(body.as_bytes()))?)
    }

    async fn search(&self, query: &str, batch: bool) -> Result<Vec<TorrentResult>> {
        let trust = self.config.trust();
        let channel = self.fetch(query).await?;
        let mut results: Vec<TorrentResult> = channel
            .into_items()
            .into_iter()
            .map(|item| map_item(item, batch, trust))
            .collect();
        sort_by_seeders(&mut results);
        debug!("nyaa returned {} results for {:?}", results.len(), query);
        Ok(results)
    }
}

fn take_ext(nyaa: &mut BTreeMap<String, Vec<Extension>>, key: &str) -> Option<String> {
    nyaa.remove(key)?.into_iter().next()?.value
}

fn map_item(mut item: Item, batch: bool, trust: Accuracy) -> TorrentResult {
    let mut nyaa = item.extensions.remove("nyaa").unwrap_or_default();

    // the feed offers a plain torrent link and sometimes a magnet enclosure
    let candidates: Vec<String> = item
        .link
        .take()
        .into_iter()
        .chain(item.enclosure.take().map(|x| x.url))
        .collect();
    let link = candidates
        .iter()
        .find(|x| x.starts_with("magnet:"))
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_default();

    let title = item.title.take().unwrap_or_default();
    let description = item.description.take().unwrap_or_default();

    let hash = parse::extract_hash(&link)
        .or_else(|| take_ext(&mut nyaa, "infoHash").map(|x| x.to_ascii_lowercase()));
    let size = take_ext(&mut nyaa, "size")
        .and_then(|x| parse::parse_size(&x))
        .or_else(|| parse::parse_size(&description));
    let seeders = take_ext(&mut nyaa, "seeders")
        .and_then(|x| x.parse().ok())
        .unwrap_or_else(|| parse::seeders(&description));
    let leechers = take_ext(&mut nyaa, "leechers")
        .and_then(|x| x.parse().ok())
        .unwrap_or_else(|| parse::leechers(&description));
    let downloads = take_ext(&mut nyaa, "downloads")
        .and_then(|x| x.parse().ok())
        .unwrap_or_else(|| parse::downloads(&description));
    let date = item
        .pub_date
        .take()
        .and_then(|x| DateTime::parse_from_str(&x, "%a, %d %b %Y %H:%M:%S %z").ok());
    let category = take_ext(&mut nyaa, "category");
    let trusted = take_ext(&mut nyaa, "trusted").as_deref() == Some("Yes");

    let title_batch = title.to_lowercase().contains("batch");
    TorrentResult {
        accuracy: if title_batch { Accuracy::High } else { trust },
        batch: batch || title_batch,
        title,
        link,
        hash,
        size,
        date,
        seeders,
        leechers,
        downloads,
        category,
        trusted,
    }
}

#[async_trait::async_trait]
impl Source for NyaaClient {
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
        match self.client.get(self.feed_url("")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

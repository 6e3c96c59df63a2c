mod nyaa;
mod nyaa_api;
pub use nyaa::{NyaaClient, NyaaConfig};
pub use nyaa_api::{ApiRevision, NyaaApiClient, NyaaApiConfig};

use anyhow::Result;
use nyafind_types::{SearchCriteria, TorrentResult};
use serde::{Deserialize, Serialize};

/// Capability contract every backend satisfies, so an aggregator can treat
/// sources polymorphically. Each operation is a single-shot fetch with no
/// state carried between calls.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Search for one episode.
    async fn single(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>>;

    /// Search biased toward bundled multi-episode releases.
    async fn batch(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>>;

    /// Movie search: forwards to the single-episode path keyed on the
    /// series identifier.
    async fn movie(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>>;

    /// Liveness probe, true iff the backend answered 2xx.
    async fn test(&self) -> bool;
}

#[async_trait::async_trait]
impl Source for Box<dyn Source + Send + Sync> {
    async fn single(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        Source::single(&**self, criteria).await
    }

    async fn batch(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        Source::batch(&**self, criteria).await
    }

    async fn movie(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentResult>> {
        Source::movie(&**self, criteria).await
    }

    async fn test(&self) -> bool {
        Source::test(&**self).await
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    Nyaa(NyaaConfig),
    NyaaApi(NyaaApiConfig),
}

impl SourceConfig {
    pub fn build(&self) -> Box<dyn Source + Send + Sync> {
        match self {
            SourceConfig::Nyaa(config) => Box::new(NyaaClient::new(config.clone())),
            SourceConfig::NyaaApi(config) => Box::new(NyaaApiClient::new(config.clone())),
        }
    }
}

// every backend returns seeders-descending; ties keep backend order
pub(crate) fn sort_by_seeders(results: &mut [TorrentResult]) {
    results.sort_by(|a, b| b.seeders.cmp(&a.seeders));
}

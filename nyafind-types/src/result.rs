use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One normalized index entry. `title` and `link` always come straight from
/// the raw entry; everything else is best-effort and never blocks
/// construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TorrentResult {
    pub title: String,
    /// magnet URI when the backend offers one, otherwise a direct link
    pub link: String,
    /// lowercase 40-hex or 32-char base32 info-hash
    pub hash: Option<String>,
    /// size in bytes
    pub size: Option<u64>,
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub seeders: u64,
    #[serde(default)]
    pub leechers: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub accuracy: Accuracy,
    /// bundled multi-episode release
    #[serde(default)]
    pub batch: bool,
    pub category: Option<String>,
    #[serde(default)]
    pub trusted: bool,
}

/// Heuristic trust level in a result's relevance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    High,
    Medium,
    Low,
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::Low
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accuracy::High => write!(f, "high"),
            Accuracy::Medium => write!(f, "medium"),
            Accuracy::Low => write!(f, "low"),
        }
    }
}

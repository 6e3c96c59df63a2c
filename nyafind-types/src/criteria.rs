use std::str::FromStr;

use serde::{Deserialize, Serialize};

use anyhow::{anyhow, Result};

/// What to search for. Everything is optional; the adapter rejects criteria
/// that carry no usable identifier before touching the network.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// candidate title strings, best match first
    #[serde(default)]
    pub titles: Vec<String>,
    /// AniDB id of the series
    pub anidb_aid: Option<u64>,
    /// AniDB id of one episode
    pub anidb_eid: Option<u64>,
    pub episode: Option<u32>,
    /// resolution token appended to the query, e.g. `1080p`
    pub resolution: Option<String>,
    /// keywords appended negated (`-term`)
    #[serde(default)]
    pub exclusions: Vec<String>,
    pub audio: Option<AudioMode>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    Dub,
    Sub,
}

impl FromStr for AudioMode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dub" => Ok(AudioMode::Dub),
            "sub" => Ok(AudioMode::Sub),
            _ => Err(()),
        }
    }
}

impl SearchCriteria {
    fn title_term(&self) -> Option<String> {
        match self.titles.len() {
            0 => None,
            1 => Some(self.titles[0].clone()),
            _ => Some(format!("({})", self.titles.join(" OR "))),
        }
    }

    /// Root term for a single-episode search: the episode id when known,
    /// otherwise the title group plus a zero-padded episode number.
    pub fn episode_term(&self) -> Result<String> {
        if let Some(eid) = self.anidb_eid {
            return Ok(eid.to_string());
        }
        let mut term = self
            .title_term()
            .ok_or_else(|| anyhow!("no anidb_eid or titles in criteria"))?;
        if let Some(episode) = self.episode {
            term.push_str(&format!(" {:02}", episode));
        }
        Ok(term)
    }

    /// Root term for a series-level (batch or movie) search.
    pub fn series_term(&self) -> Result<String> {
        if let Some(aid) = self.anidb_aid {
            return Ok(aid.to_string());
        }
        self.title_term()
            .ok_or_else(|| anyhow!("no anidb_aid or titles in criteria"))
    }
}

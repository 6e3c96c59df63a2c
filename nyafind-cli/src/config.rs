use indexmap::IndexMap;
use nyafind::{NyaaConfig, SourceConfig};
use serde::Deserialize;

fn default_source() -> String {
    "default".to_string()
}

#[derive(Deserialize)]
pub struct Config {
    /// named source adapters
    #[serde(default)]
    pub sources: IndexMap<String, SourceConfig>,
    /// name of source to query unless overridden on the command line
    #[serde(default = "default_source")]
    pub source: String,
}

impl Config {
    /// direct nyaa feed, used when no config file exists
    fn builtin() -> Self {
        let mut sources = IndexMap::new();
        sources.insert(
            default_source(),
            SourceConfig::Nyaa(NyaaConfig::default()),
        );
        Config {
            sources,
            source: default_source(),
        }
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: Config = {
        let mut path = std::env::var("NYAFIND_CONFIG").unwrap_or_default();
        if path.is_empty() {
            path = "config.yml".to_string();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_yaml::from_str(&raw).expect("failed to parse config"),
            Err(_) => Config::builtin(),
        }
    };
}

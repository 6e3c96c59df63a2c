use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use cli_table::{print_stdout, Table, WithTitle};
use config::CONFIG;
use nyafind::{NyaaApiClient, Source, SourceConfig, QUALITIES};
use nyafind_types::{Accuracy, SearchCriteria, TorrentResult};

mod config;

/// Anime torrent source search tool
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// If set, overrides the configured default source
    #[clap(short, long)]
    source: Option<String>,

    /// Prints results as JSON instead of a table
    #[clap(short, long)]
    json: bool,

    /// Increases log level
    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Search for a single episode
    Single {
        #[clap(flatten)]
        search: SearchArgs,
    },
    /// Search for a bundled batch release
    Batch {
        #[clap(flatten)]
        search: SearchArgs,
    },
    /// Search for a movie
    Movie {
        #[clap(flatten)]
        search: SearchArgs,
    },
    /// Fetches one entry directly by backend id (JSON API sources only)
    Get {
        /// Backend identifier of the entry
        id: String,
    },
    /// Probes the source and reports whether it is reachable
    Test,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Candidate title strings, best match first
    title: Vec<String>,

    /// AniDB series id
    #[clap(long)]
    aid: Option<u64>,

    /// AniDB episode id
    #[clap(long)]
    eid: Option<u64>,

    /// Episode number
    #[clap(short, long)]
    episode: Option<u32>,

    /// Target resolution, e.g. 1080p
    #[clap(short, long)]
    resolution: Option<String>,

    /// Keywords to exclude
    #[clap(short = 'x', long)]
    exclude: Vec<String>,

    /// Audio mode, either dub or sub
    #[clap(short, long)]
    audio: Option<String>,
}

impl SearchArgs {
    fn criteria(&self) -> Result<SearchCriteria> {
        if let Some(resolution) = &self.resolution {
            if !QUALITIES.contains(&resolution.trim_end_matches('p')) {
                bail!("unsupported resolution: {}", resolution);
            }
        }
        Ok(SearchCriteria {
            titles: self.title.clone(),
            anidb_aid: self.aid,
            anidb_eid: self.eid,
            episode: self.episode,
            resolution: self.resolution.clone(),
            exclusions: self.exclude.clone(),
            audio: self
                .audio
                .as_ref()
                .map(|x| x.parse())
                .transpose()
                .map_err(|_| anyhow!("invalid audio mode"))?,
        })
    }
}

lazy_static::lazy_static! {
    static ref ARGS: Args = Args::parse();
}

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .parse_env(
            env_logger::Env::default().default_filter_or(if ARGS.verbose {
                "debug"
            } else {
                "info"
            }),
        )
        .init();

    if let Err(e) = execute_mode(&ARGS.mode).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn selected_source() -> Result<&'static SourceConfig> {
    let name = ARGS.source.as_ref().unwrap_or(&CONFIG.source);
    CONFIG
        .sources
        .get(name)
        .ok_or_else(|| anyhow!("invalid source {}, not found", name))
}

#[derive(Table)]
struct ResultTable {
    #[table(title = "Title")]
    title: String,
    #[table(title = "Size")]
    size: String,
    #[table(title = "Seed")]
    seeders: u64,
    #[table(title = "Leech")]
    leechers: u64,
    #[table(title = "Done")]
    downloads: u64,
    #[table(title = "Date")]
    date: String,
    #[table(title = "Accuracy")]
    accuracy: Accuracy,
    #[table(title = "Batch")]
    batch: bool,
}

impl From<TorrentResult> for ResultTable {
    fn from(value: TorrentResult) -> Self {
        Self {
            title: value.title,
            size: value.size.map(fmt_size).unwrap_or_default(),
            seeders: value.seeders,
            leechers: value.leechers,
            downloads: value.downloads,
            date: value
                .date
                .map(|x| {
                    x.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_default(),
            accuracy: value.accuracy,
            batch: value.batch,
        }
    }
}

fn fmt_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn print_results(results: Vec<TorrentResult>) -> Result<()> {
    if ARGS.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    let rows: Vec<ResultTable> = results.into_iter().map(Into::into).collect();
    print_stdout(rows.with_title()).unwrap();
    Ok(())
}

async fn execute_mode(mode: &Mode) -> Result<()> {
    let source_config = selected_source()?;
    match mode {
        Mode::Single { search } => {
            print_results(source_config.build().single(&search.criteria()?).await?)
        }
        Mode::Batch { search } => {
            print_results(source_config.build().batch(&search.criteria()?).await?)
        }
        Mode::Movie { search } => {
            print_results(source_config.build().movie(&search.criteria()?).await?)
        }
        Mode::Get { id } => {
            let SourceConfig::NyaaApi(config) = source_config else {
                bail!("source does not support direct id lookup");
            };
            let result = NyaaApiClient::new(config.clone()).single_by_id(id).await?;
            print_results(vec![result])
        }
        Mode::Test => {
            if source_config.build().test().await {
                println!("ok");
            } else {
                println!("failed");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate log;

mod parse;
mod query;
mod source;

pub use parse::{extract_hash, parse_size};
pub use query::{batch_query, movie_query, single_query, QUALITIES};
pub use source::{
    ApiRevision, NyaaApiClient, NyaaApiConfig, NyaaClient, NyaaConfig, Source, SourceConfig,
};

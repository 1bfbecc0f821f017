pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod geo;
pub mod index;
pub mod logging;
pub mod metrics;
pub mod rerank;
pub mod search;
pub mod web;

pub use catalog::{Station, StationCatalog, StationId};
pub use config::Config;
pub use error::{Result, SearchError};
pub use geo::Coordinates;
pub use index::UserId;
pub use rerank::RankingMode;
pub use search::{Query, RawQuery, SearchEngine, SearchSession, StationInfo};

pub mod info;
pub mod search;
pub mod serve;
pub mod stats;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::search::SearchEngine;

/// Load the configuration under `root` and build an engine from it.
pub(crate) async fn load_engine(root: &Path) -> Result<(Config, SearchEngine)> {
    let config = Config::load(root)?;
    let engine = SearchEngine::from_config(&config, root)
        .await
        .with_context(|| format!("Failed to load station data under {}", root.display()))?;
    Ok((config, engine))
}

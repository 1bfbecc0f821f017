//! Shared state for request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::search::SearchEngine;

/// Cloned per request; the engine itself is shared and read-only.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(engine: Arc<SearchEngine>, config: Config) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }
}

//! Starts the JSON search API.

use anyhow::Result;
use std::env;
use std::sync::Arc;
use tracing::info;

use crate::web::{AppState, WebServer};

/// Run the serve command
///
/// Loads and embeds the catalog once, then serves until interrupted.
pub async fn run(port: Option<u16>) -> Result<()> {
    let root = env::current_dir()?;
    let (config, engine) = super::load_engine(&root).await?;

    info!(
        "Serving {} stations ({} embedded)",
        engine.catalog().len(),
        engine.reranker().vectors().len()
    );

    let port = port.unwrap_or(config.server.port);
    let host = config.server.host.clone();
    let state = AppState::new(Arc::new(engine), config);

    WebServer::new(state).start(&host, port).await
}

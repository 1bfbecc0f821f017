//! JSON search API.
//!
//! Every handler shares one [`crate::search::SearchEngine`]; the ranking
//! mode travels in each request, so concurrent callers never affect each
//! other.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Bind `host:port` and serve until the process is stopped.
    pub async fn start(self, host: &str, port: u16) -> Result<()> {
        let addr = format!("{}:{}", host, port);

        // Map front-ends are served from elsewhere
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = routes::create_router(self.state).layer(cors);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        info!("Search API listening at http://{}", addr);

        axum::serve(listener, app)
            .await
            .with_context(|| "Web server failed")?;

        Ok(())
    }
}

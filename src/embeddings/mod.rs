//! Text embedding providers used by the vector index.

mod fastembed_provider;
mod hashing;
mod provider;

pub use fastembed_provider::FastEmbedProvider;
pub use hashing::HashingEmbedder;
pub use provider::{normalize, EmbeddingProvider, HealthStatus};

use anyhow::Result;
use std::sync::Arc;

use crate::config::{EmbeddingsConfig, ProviderType};

/// Build the provider selected in configuration
pub fn create_provider(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderType::FastEmbed => Arc::new(FastEmbedProvider::new(config)?),
        ProviderType::Hashing => Arc::new(HashingEmbedder::new(config.dimension)),
    };

    tracing::info!(
        provider = provider.provider_name(),
        dimension = provider.embedding_dimension(),
        "Embedding provider ready"
    );

    Ok(provider)
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::provider::{EmbeddingProvider, HealthStatus};
use crate::config::EmbeddingsConfig;
use crate::metrics::{EMBEDDING_LATENCY, EMBEDDING_REQUESTS};

/// Output width shared by both supported models
const MODEL_DIMENSION: usize = 384;

/// Local ONNX embedding model via fastembed
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedProvider {
    /// Load the configured model, downloading it on first use
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let model_type = Self::parse_model_name(&config.model);

        info!("Loading embedding model: {}", config.model);

        let model = TextEmbedding::try_new(
            InitOptions::new(model_type).with_show_download_progress(true),
        )
        .with_context(|| format!("Failed to initialize embedding model: {}", config.model))?;

        info!("Embedding model loaded successfully");

        Ok(Self {
            model: Arc::new(model),
            dimension: MODEL_DIMENSION,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Map a configured model name to a fastembed model
    fn parse_model_name(name: &str) -> EmbeddingModel {
        match name {
            "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
            _ => {
                warn!("Unknown model '{}', falling back to bge-small-en-v1.5", name);
                EmbeddingModel::BGESmallENV15
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        EMBEDDING_REQUESTS.inc();
        let start = Instant::now();

        // fastembed is synchronous; keep it off the async workers
        let model = self.model.clone();
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        let all_embeddings = tokio::task::spawn_blocking(move || {
            let mut embeddings = Vec::with_capacity(texts.len());

            for chunk in texts.chunks(batch_size) {
                let batch: Vec<&str> = chunk.iter().map(|s| s.as_str()).collect();
                let batch_embeddings = model
                    .embed(batch, None)
                    .with_context(|| "Failed to generate embeddings")?;
                embeddings.extend(batch_embeddings);
            }

            Ok::<Vec<Vec<f32>>, anyhow::Error>(embeddings)
        })
        .await
        .context("FastEmbed processing task failed")??;

        EMBEDDING_LATENCY.observe(start.elapsed().as_secs_f64());

        Ok(all_embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[query.to_string()]).await?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated for query"))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        match self.embed(&["health check".to_string()]).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy {
                error: e.to_string(),
            }),
        }
    }
}

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use electrifind::embeddings::{EmbeddingProvider, HashingEmbedder, HealthStatus};

/// Hashing embedder that counts prompt embeddings.
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    queries: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    pub fn new(dimension: usize) -> (Self, Arc<AtomicUsize>) {
        let queries = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: HashingEmbedder::new(dimension),
                queries: Arc::clone(&queries),
            },
            queries,
        )
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.inner.embed(texts).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_query(query).await
    }

    fn embedding_dimension(&self) -> usize {
        self.inner.embedding_dimension()
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }

    fn max_batch_size(&self) -> usize {
        self.inner.max_batch_size()
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::Healthy)
    }
}

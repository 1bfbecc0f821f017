use anyhow::Result;
use async_trait::async_trait;

/// Turns station descriptions and search prompts into dense vectors.
///
/// Station descriptions and prompts must land in the same space; the
/// vector index compares them with a dot product after normalising.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed station descriptions, one vector per input in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a requester's prompt
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;

    fn embedding_dimension(&self) -> usize;

    /// Short name for logs and the stats command
    fn provider_name(&self) -> &'static str;

    /// Largest batch `embed` should be given at once
    fn max_batch_size(&self) -> usize;

    async fn health_check(&self) -> Result<HealthStatus>;
}

/// Result of [`EmbeddingProvider::health_check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy { error: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Scale a vector to unit length in place. Zero vectors are left as-is.
pub fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for v in vector.iter_mut() {
            *v /= magnitude;
        }
    }
}

use anyhow::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::provider::{normalize, EmbeddingProvider, HealthStatus};

/// Offline embedding provider based on feature hashing.
///
/// Tokens and adjacent-token bigrams are hashed into a fixed number of
/// signed buckets, then L2-normalised. Texts sharing vocabulary land close
/// together, which is enough for keyword-flavoured prompts like
/// "tesla supercharger" or "free parking garage". Needs no model download.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();

        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    pub fn text_to_vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        let tokens = Self::tokens(text);

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.text_to_vector(t)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        Ok(self.text_to_vector(query))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }

    fn max_batch_size(&self) -> usize {
        1000
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::Healthy)
    }
}

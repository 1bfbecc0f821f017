//! Per-station embeddings and prompt similarity scoring.

use anyhow::{bail, Context};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::catalog::{StationCatalog, StationId};
use crate::embeddings::{normalize, EmbeddingProvider};
use crate::error::{Result, SearchError};
use crate::metrics::INDEXED_STATIONS;

/// Precomputed unit-length embedding for every catalog station.
///
/// Built once from [`crate::catalog::Station::description`] and never
/// mutated, so it can be shared across concurrent queries.
pub struct VectorIndex {
    provider: Arc<dyn EmbeddingProvider>,
    embeddings: HashMap<StationId, Vec<f32>>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every station in the catalog.
    pub async fn build(
        catalog: &StationCatalog,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> anyhow::Result<Self> {
        Self::build_with_progress(catalog, provider, ProgressBar::hidden()).await
    }

    /// Same as [`VectorIndex::build`], reporting progress per batch.
    pub async fn build_with_progress(
        catalog: &StationCatalog,
        provider: Arc<dyn EmbeddingProvider>,
        progress: ProgressBar,
    ) -> anyhow::Result<Self> {
        let start = Instant::now();
        let dimension = provider.embedding_dimension();
        let batch_size = provider.max_batch_size().max(1);
        let stations: Vec<_> = catalog.all().collect();

        progress.set_length(stations.len() as u64);
        let mut embeddings = HashMap::with_capacity(stations.len());

        for chunk in stations.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|s| s.description()).collect();
            let vectors = provider
                .embed(&texts)
                .await
                .with_context(|| format!("Failed to embed {} station descriptions", texts.len()))?;

            if vectors.len() != texts.len() {
                bail!(
                    "Embedding provider returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                );
            }

            for (station, mut vector) in chunk.iter().zip(vectors) {
                if vector.len() != dimension {
                    bail!(
                        "Station {} embedded to {} dimensions, expected {}",
                        station.id,
                        vector.len(),
                        dimension
                    );
                }
                normalize(&mut vector);
                embeddings.insert(station.id, vector);
            }

            progress.inc(chunk.len() as u64);
        }

        progress.finish_and_clear();
        INDEXED_STATIONS.set(embeddings.len() as f64);

        info!(
            provider = provider.provider_name(),
            stations = embeddings.len(),
            dimension,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Vector index built"
        );

        Ok(Self {
            provider,
            embeddings,
            dimension,
        })
    }

    /// Cosine similarity between `prompt` and each candidate.
    ///
    /// The prompt is embedded once. Candidates without an embedding are
    /// left out of the map. Fails with `MissingPrompt` on blank input.
    pub async fn score(
        &self,
        prompt: &str,
        candidates: &[StationId],
    ) -> Result<HashMap<StationId, f32>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SearchError::MissingPrompt);
        }

        let mut query = self
            .provider
            .embed_query(prompt)
            .await
            .map_err(SearchError::Embedding)?;

        if query.len() != self.dimension {
            return Err(SearchError::Embedding(anyhow::anyhow!(
                "Prompt embedded to {} dimensions, index has {}",
                query.len(),
                self.dimension
            )));
        }
        normalize(&mut query);

        let scores: HashMap<StationId, f32> = candidates
            .par_iter()
            .filter_map(|id| {
                self.embeddings
                    .get(id)
                    .map(|embedding| (*id, dot(&query, embedding)))
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            scored = scores.len(),
            "Scored candidates by similarity"
        );

        Ok(scores)
    }

    pub fn embedding(&self, id: StationId) -> Option<&[f32]> {
        self.embeddings.get(&id).map(Vec::as_slice)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

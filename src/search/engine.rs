use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use super::Query;
use crate::catalog::{load_stations_csv, Station, StationCatalog, StationId};
use crate::config::{Config, SearchConfig};
use crate::embeddings::create_provider;
use crate::error::Result;
use crate::geo::{Coordinates, GeoFilter, RadiusBuckets};
use crate::index::{load_interactions_csv, CollaborativeSignal, UserId, VectorIndex};
use crate::metrics::{CANDIDATES_SCORED, SEARCH_LATENCY, SEARCH_REQUESTS, SEARCH_RESULTS};
use crate::rerank::{BlendWeights, RankingMode, Reranker};

/// Display record for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    pub id: StationId,
    pub station_name: String,
    pub street_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub ev_network: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_types: Option<String>,
}

impl StationInfo {
    /// Text for a map marker popup.
    pub fn marker_label(&self) -> String {
        format!(
            "Name: {}\nAddress: {}\nNetwork: {}",
            self.station_name, self.street_address, self.ev_network
        )
    }
}

impl From<&Station> for StationInfo {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            station_name: station.name.clone(),
            street_address: station.street_address.clone(),
            city: station.city.clone(),
            state: station.state.clone(),
            zip: station.zip.clone(),
            ev_network: station.network_or_default().to_string(),
            latitude: station.coordinates.lat,
            longitude: station.coordinates.lng,
            connector_types: station.connector_types.clone(),
        }
    }
}

/// Retrieval and ranking over an immutable catalog.
///
/// Holds no per-request state; one engine serves any number of concurrent
/// queries.
pub struct SearchEngine {
    catalog: Arc<StationCatalog>,
    geo: GeoFilter,
    reranker: Reranker,
    max_candidates: usize,
    radius: RadiusBuckets,
    default_mode: RankingMode,
}

impl SearchEngine {
    pub fn new(
        catalog: Arc<StationCatalog>,
        vectors: Arc<VectorIndex>,
        affinity: Arc<CollaborativeSignal>,
        config: &SearchConfig,
    ) -> Self {
        let geo = GeoFilter::new(&catalog);
        let reranker = Reranker::new(vectors, affinity, BlendWeights::new(config.blend_alpha));

        Self {
            catalog,
            geo,
            reranker,
            max_candidates: config.max_candidates.max(1),
            radius: config.radius.clone(),
            default_mode: config.default_mode,
        }
    }

    /// Load the catalog and interactions named in `config` and embed every
    /// station.
    pub async fn from_config(config: &Config, root: &Path) -> anyhow::Result<Self> {
        let stations_path = config.stations_path(root);
        let stations = load_stations_csv(&stations_path)?;
        let catalog = Arc::new(StationCatalog::new(stations).context("Failed to build catalog")?);

        let affinity = match config.interactions_path(root) {
            Some(path) => {
                let interactions = load_interactions_csv(&path, &catalog)?;
                CollaborativeSignal::from_interactions(interactions)
            }
            None => {
                info!("No interaction data configured, affinity is neutral for everyone");
                CollaborativeSignal::empty()
            }
        };

        let provider = create_provider(&config.embeddings)?;
        info!(
            "Embedding {} stations with the {} provider",
            catalog.len(),
            provider.provider_name()
        );

        let progress = ProgressBar::new(catalog.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] Embedding: [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        let vectors = VectorIndex::build_with_progress(&catalog, provider, progress).await?;

        Ok(Self::new(
            catalog,
            Arc::new(vectors),
            Arc::new(affinity),
            &config.search,
        ))
    }

    /// Run a validated query and return station ids in final order.
    ///
    /// Every check happens before any scoring; an empty neighbourhood is an
    /// empty result, not an error.
    #[instrument(skip(self, query), fields(mode = %query.mode, radius = query.radius))]
    pub async fn search(&self, query: &Query) -> Result<Vec<StationId>> {
        let start = Instant::now();
        SEARCH_REQUESTS.inc();

        query.validate()?;

        let mut candidates = self.geo.select(&query.origin, query.radius);
        if candidates.len() > self.max_candidates {
            debug!(
                "Truncating {} candidates to the nearest {}",
                candidates.len(),
                self.max_candidates
            );
            candidates.truncate(self.max_candidates);
        }
        CANDIDATES_SCORED.observe(candidates.len() as f64);

        let ranked = if candidates.is_empty() {
            Vec::new()
        } else {
            self.reranker
                .rerank(
                    query.mode,
                    query.prompt.as_deref(),
                    query.user,
                    &candidates,
                )
                .await?
        };

        let elapsed = start.elapsed();
        SEARCH_LATENCY.observe(elapsed.as_secs_f64());
        SEARCH_RESULTS.observe(ranked.len() as f64);
        info!(
            mode = query.mode.strategy(),
            origin = %query.origin,
            candidates = candidates.len(),
            results = ranked.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        Ok(ranked)
    }

    /// Search from raw coordinates in the given mode.
    pub async fn get_results_all(
        &self,
        mode: RankingMode,
        lat: f64,
        lng: f64,
        prompt: Option<&str>,
        user: Option<UserId>,
        radius: f64,
    ) -> Result<Vec<StationId>> {
        let origin = Coordinates::new(lat, lng)?;
        let mut query = Query::new(origin, radius, mode).with_user(user);
        if let Some(prompt) = prompt {
            query = query.with_prompt(prompt);
        }
        self.search(&query).await
    }

    /// Display records for `ids`, in the order given.
    ///
    /// Fails on the first id the catalog does not contain.
    pub fn get_station_info(&self, ids: &[StationId]) -> Result<Vec<StationInfo>> {
        ids.iter()
            .map(|&id| self.catalog.get(id).map(StationInfo::from))
            .collect()
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn radius_buckets(&self) -> &RadiusBuckets {
        &self.radius
    }

    pub fn default_mode(&self) -> RankingMode {
        self.default_mode
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }
}

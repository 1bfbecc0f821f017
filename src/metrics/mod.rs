//! Prometheus metrics for electrifind
//!
//! Counters and histograms for queries, candidate scoring, and embedding.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Once;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Search metrics
    // ============================================================================

    /// Total number of search requests
    pub static ref SEARCH_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "electrifind_search_requests_total",
            "Total number of search requests"
        )
    ).expect("Failed to create SEARCH_REQUESTS counter");

    /// Search request latency in seconds
    pub static ref SEARCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "electrifind_search_latency_seconds",
            "Search request latency in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0])
    ).expect("Failed to create SEARCH_LATENCY histogram");

    /// Number of stations returned per request
    pub static ref SEARCH_RESULTS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "electrifind_search_results_count",
            "Number of stations returned per request"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0])
    ).expect("Failed to create SEARCH_RESULTS histogram");

    /// Candidates handed to the reranker per request
    pub static ref CANDIDATES_SCORED: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "electrifind_candidates_scored_count",
            "Candidates handed to the reranker per request"
        ).buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0])
    ).expect("Failed to create CANDIDATES_SCORED histogram");

    // ============================================================================
    // Index metrics
    // ============================================================================

    /// Stations with an embedding in the vector index
    pub static ref INDEXED_STATIONS: Gauge = Gauge::with_opts(
        Opts::new(
            "electrifind_indexed_stations_total",
            "Stations with an embedding in the vector index"
        )
    ).expect("Failed to create INDEXED_STATIONS gauge");

    // ============================================================================
    // Embedding metrics
    // ============================================================================

    /// Total embedding generation requests
    pub static ref EMBEDDING_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "electrifind_embedding_requests_total",
            "Total embedding generation requests"
        )
    ).expect("Failed to create EMBEDDING_REQUESTS counter");

    /// Embedding generation latency in seconds
    pub static ref EMBEDDING_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "electrifind_embedding_latency_seconds",
            "Embedding generation latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0])
    ).expect("Failed to create EMBEDDING_LATENCY histogram");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry
///
/// Safe to call more than once; only the first call registers.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(SEARCH_REQUESTS.clone()))
            .expect("Failed to register SEARCH_REQUESTS");
        REGISTRY
            .register(Box::new(SEARCH_LATENCY.clone()))
            .expect("Failed to register SEARCH_LATENCY");
        REGISTRY
            .register(Box::new(SEARCH_RESULTS.clone()))
            .expect("Failed to register SEARCH_RESULTS");
        REGISTRY
            .register(Box::new(CANDIDATES_SCORED.clone()))
            .expect("Failed to register CANDIDATES_SCORED");
        REGISTRY
            .register(Box::new(INDEXED_STATIONS.clone()))
            .expect("Failed to register INDEXED_STATIONS");
        REGISTRY
            .register(Box::new(EMBEDDING_REQUESTS.clone()))
            .expect("Failed to register EMBEDDING_REQUESTS");
        REGISTRY
            .register(Box::new(EMBEDDING_LATENCY.clone()))
            .expect("Failed to register EMBEDDING_LATENCY");
    });
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Point-in-time view of the metrics, for the `stats` command
pub struct MetricSnapshot {
    pub search_requests_total: f64,
    pub search_latency_avg: f64,
    pub search_results_avg: f64,
    pub candidates_scored_avg: f64,
    pub indexed_stations: f64,
    pub embedding_requests_total: f64,
    pub embedding_latency_avg: f64,
}

impl MetricSnapshot {
    /// Capture the current state of all metrics
    pub fn capture() -> Self {
        Self {
            search_requests_total: SEARCH_REQUESTS.get(),
            search_latency_avg: calculate_histogram_avg(&SEARCH_LATENCY),
            search_results_avg: calculate_histogram_avg(&SEARCH_RESULTS),
            candidates_scored_avg: calculate_histogram_avg(&CANDIDATES_SCORED),
            indexed_stations: INDEXED_STATIONS.get(),
            embedding_requests_total: EMBEDDING_REQUESTS.get(),
            embedding_latency_avg: calculate_histogram_avg(&EMBEDDING_LATENCY),
        }
    }
}

/// Calculate the average value from a histogram
fn calculate_histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}

//! HTTP request handlers for the search API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};

use super::state::AppState;
use crate::catalog::StationId;
use crate::error::SearchError;
use crate::geo::{Coordinates, RadiusBuckets};
use crate::metrics;
use crate::rerank::RankingMode;
use crate::search::{RawQuery, StationInfo};

/// Search request payload: the raw form fields plus an optional cap.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: RawQuery,
    /// Maximum number of stations to return
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub mode: RankingMode,
    pub origin: Coordinates,
    pub radius: f64,
    /// Stations that passed the radius filter, before `limit`
    pub total: usize,
    pub stations: Vec<StationInfo>,
    pub took_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StationBatchRequest {
    pub ids: Vec<StationId>,
}

/// Settings a map front-end needs before its first search.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub default_origin: Coordinates,
    pub default_mode: RankingMode,
    pub modes: Vec<String>,
    pub radius: RadiusBuckets,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub stations: usize,
}

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wraps [`SearchError`] with its HTTP status.
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Rank stations around a location.
///
/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let engine = &state.engine;

    let query = request.query.parse(engine.radius_buckets())?;
    info!(
        mode = %query.mode,
        origin = %query.origin,
        radius = query.radius,
        "Processing search request"
    );

    let ids = engine.search(&query).await?;
    let shown = match request.limit {
        Some(limit) => &ids[..ids.len().min(limit)],
        None => &ids[..],
    };
    let stations = engine.get_station_info(shown)?;

    Ok(Json(SearchResponse {
        mode: query.mode,
        origin: query.origin,
        radius: query.radius,
        total: ids.len(),
        stations,
        took_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Display record for one station.
///
/// GET /api/stations/{id}
pub async fn station(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StationInfo>, ApiError> {
    let mut records = state.engine.get_station_info(&[StationId(id)])?;
    match records.pop() {
        Some(record) => Ok(Json(record)),
        None => Err(SearchError::NotFound(StationId(id)).into()),
    }
}

/// Display records for several stations, in request order.
///
/// POST /api/stations
pub async fn station_batch(
    State(state): State<AppState>,
    Json(request): Json<StationBatchRequest>,
) -> Result<Json<Vec<StationInfo>>, ApiError> {
    Ok(Json(state.engine.get_station_info(&request.ids)?))
}

/// GET /api/config
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        default_origin: state.config.search.default_origin,
        default_mode: state.engine.default_mode(),
        modes: RankingMode::ALL
            .iter()
            .map(|m| m.as_str().to_string())
            .collect(),
        radius: state.engine.radius_buckets().clone(),
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stations: state.engine.catalog().len(),
    })
}

/// Prometheus metrics endpoint.
///
/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    let output = metrics::gather_metrics();
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output)
}

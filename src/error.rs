//! Error types for the retrieval and ranking core.
//!
//! Every variant is deterministic for a given input and renders a message
//! that can be shown to the requester as-is.

use thiserror::Error;

use crate::catalog::StationId;

/// Failures surfaced by catalog lookups, query validation, and ranking.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Latitude/longitude missing, unparseable, non-finite, or out of range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Sort mode is missing or not one of the known names
    #[error("Invalid sort mode '{0}'. Valid options are: distance, base, cf")]
    InvalidMode(String),

    /// Radius category is missing or not one of the configured buckets
    #[error("Invalid radius '{0}'. Valid options are: small, med, large")]
    InvalidRadius(String),

    #[error("A search prompt is required for semantic ranking.")]
    MissingPrompt,

    #[error("User ID is required for collaborative filtering.")]
    MissingUser,

    #[error("Station {0} not found")]
    NotFound(StationId),

    /// Station data violated a catalog invariant while building
    #[error("Invalid station catalog: {0}")]
    Catalog(String),

    /// The embedding provider failed to embed a prompt
    #[error("Embedding failed: {0:#}")]
    Embedding(#[source] anyhow::Error),
}

impl SearchError {
    /// True for errors caused by the caller's input rather than the engine.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinates(_)
                | Self::InvalidMode(_)
                | Self::InvalidRadius(_)
                | Self::MissingPrompt
                | Self::MissingUser
        )
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

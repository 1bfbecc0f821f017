use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, SearchError};

/// Coarse search radius the requester picks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusCategory {
    Small,
    Med,
    Large,
}

impl FromStr for RadiusCategory {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "med" | "medium" => Ok(Self::Med),
            "large" => Ok(Self::Large),
            other => Err(SearchError::InvalidRadius(other.to_string())),
        }
    }
}

impl std::fmt::Display for RadiusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Med => write!(f, "med"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// Degree thresholds behind each radius category.
///
/// These are per-axis degree deltas, not metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusBuckets {
    #[serde(default = "default_small")]
    pub small: f64,

    #[serde(default = "default_med")]
    pub med: f64,

    #[serde(default = "default_large")]
    pub large: f64,
}

impl Default for RadiusBuckets {
    fn default() -> Self {
        Self {
            small: default_small(),
            med: default_med(),
            large: default_large(),
        }
    }
}

fn default_small() -> f64 {
    0.01
}

fn default_med() -> f64 {
    0.03
}

fn default_large() -> f64 {
    0.05
}

impl RadiusBuckets {
    /// Threshold in degrees for a category.
    pub fn degrees(&self, category: RadiusCategory) -> f64 {
        match category {
            RadiusCategory::Small => self.small,
            RadiusCategory::Med => self.med,
            RadiusCategory::Large => self.large,
        }
    }

    /// Resolve a category name straight to its threshold.
    pub fn resolve(&self, name: &str) -> Result<f64> {
        Ok(self.degrees(name.parse()?))
    }
}

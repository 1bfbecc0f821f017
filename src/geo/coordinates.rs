use ::geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// A validated WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(SearchError::InvalidCoordinates(format!(
                "({}, {}) is not a finite coordinate pair",
                lat, lng
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(SearchError::InvalidCoordinates(format!(
                "latitude {} is outside [-90, 90]",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(SearchError::InvalidCoordinates(format!(
                "longitude {} is outside [-180, 180]",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Parse coordinates from the raw text a form or CLI hands over.
    pub fn parse(lat: &str, lng: &str) -> Result<Self> {
        let (lat, lng) = (lat.trim(), lng.trim());
        if lat.is_empty() || lng.is_empty() {
            return Err(SearchError::InvalidCoordinates(
                "Latitude and Longitude are required.".to_string(),
            ));
        }
        let parse = |raw: &str, axis: &str| {
            raw.parse::<f64>().map_err(|_| {
                SearchError::InvalidCoordinates(format!("{} '{}' is not a number", axis, raw))
            })
        };
        Self::new(parse(lat, "latitude")?, parse(lng, "longitude")?)
    }

    /// Largest per-axis delta in degrees. This is the eligibility metric.
    pub fn chebyshev_degrees(&self, other: &Self) -> f64 {
        (self.lat - other.lat)
            .abs()
            .max((self.lng - other.lng).abs())
    }

    /// Great-circle distance in metres, used for ordering.
    pub fn haversine_meters(&self, other: &Self) -> f64 {
        self.to_point().haversine_distance(&other.to_point())
    }

    /// R-tree key: `[x, y]` = `[lng, lat]`.
    pub(crate) fn as_xy(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    fn to_point(self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

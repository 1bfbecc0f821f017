//! The immutable in-memory station catalog.
//!
//! Built once at startup (usually from the NREL CSV export via
//! [`load_stations_csv`]) and shared read-only afterwards. Every other
//! component refers to stations by [`StationId`].

mod loader;
mod station;

pub use loader::load_stations_csv;
pub use station::{Station, StationId};

use std::collections::HashMap;

use crate::error::{Result, SearchError};

/// Stations in insertion order with O(1) lookup by id.
#[derive(Debug, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
    positions: HashMap<StationId, usize>,
}

impl StationCatalog {
    /// Build a catalog, enforcing unique ids.
    ///
    /// Coordinates are already validated by [`crate::geo::Coordinates`],
    /// but are re-checked here because `Station` fields are public.
    pub fn new(stations: Vec<Station>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(stations.len());

        for (position, station) in stations.iter().enumerate() {
            let c = station.coordinates;
            crate::geo::Coordinates::new(c.lat, c.lng).map_err(|e| {
                SearchError::Catalog(format!("station {}: {}", station.id, e))
            })?;

            if positions.insert(station.id, position).is_some() {
                return Err(SearchError::Catalog(format!(
                    "duplicate station id {}",
                    station.id
                )));
            }
        }

        Ok(Self {
            stations,
            positions,
        })
    }

    /// Look up a station by id.
    pub fn get(&self, id: StationId) -> Result<&Station> {
        self.positions
            .get(&id)
            .map(|&position| &self.stations[position])
            .ok_or(SearchError::NotFound(id))
    }

    pub fn contains(&self, id: StationId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Insertion-order position of a station, used as the final tiebreak.
    pub fn position(&self, id: StationId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// All stations in insertion order. Call again to restart.
    pub fn all(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

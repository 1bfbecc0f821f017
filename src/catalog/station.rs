use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Stable station identifier (the NREL `ID` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u64);

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A charging station as loaded from the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub coordinates: Coordinates,
    pub name: String,
    pub street_address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub connector_types: Option<String>,
    #[serde(default)]
    pub facility_type: Option<String>,
    #[serde(default)]
    pub access_hours: Option<String>,
}

impl Station {
    /// Minimal station; the optional display fields start empty.
    pub fn new(
        id: impl Into<StationId>,
        coordinates: Coordinates,
        name: impl Into<String>,
        street_address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            coordinates,
            name: name.into(),
            street_address: street_address.into(),
            city: None,
            state: None,
            zip: None,
            network: None,
            connector_types: None,
            facility_type: None,
            access_hours: None,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn with_locality(
        mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self.zip = Some(zip.into());
        self
    }

    pub fn with_connector_types(mut self, connectors: impl Into<String>) -> Self {
        self.connector_types = Some(connectors.into());
        self
    }

    pub fn with_facility_type(mut self, facility: impl Into<String>) -> Self {
        self.facility_type = Some(facility.into());
        self
    }

    pub fn with_access_hours(mut self, hours: impl Into<String>) -> Self {
        self.access_hours = Some(hours.into());
        self
    }

    /// Network name for display; NREL leaves it blank for independents.
    pub fn network_or_default(&self) -> &str {
        self.network.as_deref().unwrap_or("Non-Networked")
    }

    /// Text the vector index embeds for this station.
    pub fn description(&self) -> String {
        let locality = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        let mut parts = vec![self.name.clone(), self.street_address.clone()];
        if !locality.is_empty() {
            parts.push(locality);
        }
        if let Some(network) = &self.network {
            parts.push(format!("network {}", network));
        }
        if let Some(connectors) = &self.connector_types {
            // NREL separates connector codes with spaces
            parts.push(format!("connectors {}", connectors.replace('_', " ")));
        }
        if let Some(facility) = &self.facility_type {
            parts.push(facility.replace('_', " ").to_lowercase());
        }
        if let Some(hours) = &self.access_hours {
            parts.push(hours.clone());
        }

        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

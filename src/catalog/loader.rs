//! NREL alternative-fuel-station CSV loading.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use super::station::{Station, StationId};
use crate::geo::Coordinates;

const ID: &str = "ID";
const NAME: &str = "Station Name";
const ADDRESS: &str = "Street Address";
const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";

const CITY: &str = "City";
const STATE: &str = "State";
const ZIP: &str = "ZIP";
const NETWORK: &str = "EV Network";
const CONNECTORS: &str = "EV Connector Types";
const FACILITY: &str = "Facility Type";
const ACCESS: &str = "Access Days Time";

const REQUIRED_COLUMNS: [&str; 5] = [ID, NAME, ADDRESS, LATITUDE, LONGITUDE];
const OPTIONAL_COLUMNS: [&str; 7] = [CITY, STATE, ZIP, NETWORK, CONNECTORS, FACILITY, ACCESS];

/// Columns read verbatim; inference would turn a ZIP like `02134` into 2134.
const TEXT_COLUMNS: [&str; 9] = [
    NAME, ADDRESS, CITY, STATE, ZIP, NETWORK, CONNECTORS, FACILITY, ACCESS,
];

/// Read stations from an NREL-style CSV export.
///
/// Rows without an id or with unusable coordinates are skipped with a
/// warning. Optional display columns are picked up when present.
pub fn load_stations_csv(path: &Path) -> Result<Vec<Station>> {
    // No inference pass: only the header names are needed here
    let header = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("Failed to open station data {:?}", path))?
        .collect_schema()
        .with_context(|| format!("Failed to read header of {:?}", path))?;

    for column in REQUIRED_COLUMNS {
        if !header.contains(column) {
            bail!("Station data {:?} is missing required column '{}'", path, column);
        }
    }

    let text_schema = Schema::from_iter(
        TEXT_COLUMNS
            .into_iter()
            .filter(|name| header.contains(name))
            .map(|name| (PlSmallStr::from_static(name), DataType::String)),
    );

    let mut frame = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .with_dtype_overwrite(Some(text_schema.into()))
        .finish()
        .with_context(|| format!("Failed to open station data {:?}", path))?;

    let schema = frame
        .collect_schema()
        .with_context(|| format!("Failed to read header of {:?}", path))?;

    let mut columns = vec![
        col(ID).cast(DataType::UInt64),
        col(NAME).cast(DataType::String),
        col(ADDRESS).cast(DataType::String),
        col(LATITUDE).cast(DataType::Float64),
        col(LONGITUDE).cast(DataType::Float64),
    ];
    columns.extend(
        OPTIONAL_COLUMNS
            .into_iter()
            .filter(|name| schema.contains(name))
            .map(|name| col(name).cast(DataType::String)),
    );

    let df = frame
        .select(columns)
        .collect()
        .with_context(|| format!("Failed to parse station data {:?}", path))?;

    let ids = df.column(ID)?.u64()?;
    let names = df.column(NAME)?.str()?;
    let addresses = df.column(ADDRESS)?.str()?;
    let latitudes = df.column(LATITUDE)?.f64()?;
    let longitudes = df.column(LONGITUDE)?.f64()?;

    let optional = |name: &str| df.column(name).ok().and_then(|c| c.str().ok());
    let cities = optional(CITY);
    let states = optional(STATE);
    let zips = optional(ZIP);
    let networks = optional(NETWORK);
    let connectors = optional(CONNECTORS);
    let facilities = optional(FACILITY);
    let access = optional(ACCESS);

    let mut stations = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for row in 0..df.height() {
        let (Some(id), Some(lat), Some(lng)) =
            (ids.get(row), latitudes.get(row), longitudes.get(row))
        else {
            skipped += 1;
            continue;
        };

        let coordinates = match Coordinates::new(lat, lng) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                warn!(station_id = id, error = %e, "Skipping station with invalid coordinates");
                skipped += 1;
                continue;
            }
        };

        let text = |column: Option<&StringChunked>| {
            column
                .and_then(|c| c.get(row))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        stations.push(Station {
            id: StationId(id),
            coordinates,
            name: names.get(row).unwrap_or_default().trim().to_string(),
            street_address: addresses.get(row).unwrap_or_default().trim().to_string(),
            city: text(cities),
            state: text(states),
            zip: text(zips),
            network: text(networks),
            connector_types: text(connectors),
            facility_type: text(facilities),
            access_hours: text(access),
        });
    }

    if skipped > 0 {
        warn!(skipped, path = %path.display(), "Skipped unusable station rows");
    }
    info!(stations = stations.len(), path = %path.display(), "Loaded station data");

    Ok(stations)
}

use anyhow::Result;
use std::env;

use crate::search::{RawQuery, StationInfo};

/// Options for a single command-line search.
pub struct SearchArgs {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub prompt: Option<String>,
    pub user: Option<String>,
    pub sort: String,
    pub radius: String,
    pub limit: usize,
    pub json: bool,
}

/// Run the search command
///
/// Missing coordinates fall back to the configured map centre. Validation
/// failures are reported with the same messages the API returns.
pub async fn run(args: SearchArgs) -> Result<()> {
    let root = env::current_dir()?;
    let (config, engine) = super::load_engine(&root).await?;

    let origin = config.search.default_origin;
    let raw = RawQuery {
        lat: Some(args.lat.unwrap_or_else(|| origin.lat.to_string())),
        lng: Some(args.lng.unwrap_or_else(|| origin.lng.to_string())),
        prompt: args.prompt,
        user_id: args.user,
        sort: Some(args.sort),
        radius: Some(args.radius),
    };

    let query = raw.parse(engine.radius_buckets())?;
    let ids = engine.search(&query).await?;
    let shown = &ids[..ids.len().min(args.limit)];
    let stations = engine.get_station_info(shown)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stations)?);
        return Ok(());
    }

    if stations.is_empty() {
        println!("No stations found within the {} radius of {}", raw.radius.as_deref().unwrap_or_default(), query.origin);
        return Ok(());
    }

    println!(
        "Found {} stations near {} (sorted by {}), showing {}\n",
        ids.len(),
        query.origin,
        query.mode.strategy(),
        stations.len()
    );
    for (i, station) in stations.iter().enumerate() {
        println!("{}", format_station(i + 1, station));
    }

    Ok(())
}

fn format_station(rank: usize, station: &StationInfo) -> String {
    format!(
        "{}. {} [{}]\n   {}\n   {} ({:.5}, {:.5})\n",
        rank,
        station.station_name,
        station.id,
        station.street_address,
        station.ev_network,
        station.latitude,
        station.longitude
    )
}

use anyhow::Result;
use std::env;

use crate::catalog::StationId;

/// Print display records for the given ids, in order.
pub async fn run(ids: &[u64]) -> Result<()> {
    let root = env::current_dir()?;
    let (_, engine) = super::load_engine(&root).await?;

    let ids: Vec<StationId> = ids.iter().copied().map(StationId).collect();
    for station in engine.get_station_info(&ids)? {
        println!("[{}]\n{}\n", station.id, station.marker_label());
    }

    Ok(())
}

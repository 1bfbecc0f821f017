//! Stats command for displaying catalog statistics and metrics

use anyhow::Result;
use std::env;

use crate::metrics::{gather_metrics, MetricSnapshot};

/// Run the stats command
///
/// Loading the engine sets the indexed-stations gauge, so both outputs
/// reflect the current data.
pub async fn run(prometheus: bool) -> Result<()> {
    let root = env::current_dir()?;
    let (config, engine) = super::load_engine(&root).await?;

    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let snapshot = MetricSnapshot::capture();
    let affinity = engine.reranker().affinity();
    let health = engine.reranker().vectors().provider().health_check().await?;

    println!("Electrifind Catalog Statistics");
    println!("==============================\n");

    println!("Catalog:");
    println!("  Stations:          {}", engine.catalog().len());
    println!("  Embedded stations: {:.0}", snapshot.indexed_stations);
    println!(
        "  Embedding model:   {} ({} dims)",
        engine.reranker().vectors().provider_name(),
        engine.reranker().vectors().dimension()
    );
    if health.is_healthy() {
        println!("  Embedding health:  ok");
    } else {
        println!("  Embedding health:  {:?}", health);
    }
    println!();

    println!("Interactions:");
    println!("  Users:             {}", affinity.user_count());
    println!("  Rated stations:    {}", affinity.station_count());
    println!();

    println!("Ranking:");
    println!("  Default mode:      {}", config.search.default_mode);
    println!("  Blend alpha:       {:.2}", engine.reranker().blend().alpha());
    println!("  Max candidates:    {}", engine.max_candidates());
    println!(
        "  Radius buckets:    small={} med={} large={}",
        config.search.radius.small, config.search.radius.med, config.search.radius.large
    );
    println!();

    println!("Data:");
    println!("  Stations file:     {}", config.stations_path(&root).display());
    match config.interactions_path(&root) {
        Some(path) => println!("  Interactions file: {}", path.display()),
        None => println!("  Interactions file: (none)"),
    }

    Ok(())
}

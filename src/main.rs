use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use electrifind::cli::{Cli, Commands};
use electrifind::commands::search::SearchArgs;
use electrifind::config::Config;
use electrifind::logging::init_logging;
use electrifind::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let data_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = Config::load(&data_root).unwrap_or_default();

    // Held until exit so buffered log lines are flushed
    let _logging_guard = init_logging(&config.logging, &data_root)?;

    tracing::info!("Electrifind starting up");
    tracing::debug!("Data root: {}", data_root.display());

    metrics::register_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            lat,
            lng,
            prompt,
            user,
            sort,
            radius,
            limit,
            json,
        } => {
            electrifind::commands::search::run(SearchArgs {
                lat,
                lng,
                prompt,
                user,
                sort,
                radius,
                limit,
                json,
            })
            .await?;
        }
        Commands::Info { ids } => {
            electrifind::commands::info::run(&ids).await?;
        }
        Commands::Serve { port } => {
            electrifind::commands::serve::run(port).await?;
        }
        Commands::Stats { prometheus } => {
            electrifind::commands::stats::run(prometheus).await?;
        }
    }

    Ok(())
}

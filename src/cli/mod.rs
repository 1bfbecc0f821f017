use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "electrifind")]
#[command(author, version, about = "EV charging station finder with semantic and collaborative ranking")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find stations around a location
    Search {
        /// Latitude of the search origin (defaults to the configured map centre)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude of the search origin (defaults to the configured map centre)
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,

        /// Free-text description of the station you want
        #[arg(short, long)]
        prompt: Option<String>,

        /// Requester id for collaborative ranking (-1 means anonymous)
        #[arg(short, long, allow_hyphen_values = true)]
        user: Option<String>,

        /// Ranking mode: distance, base, or cf
        #[arg(short, long, default_value = "distance")]
        sort: String,

        /// Search radius: small, med, or large
        #[arg(short, long, default_value = "small")]
        radius: String,

        /// Maximum number of stations to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show display records for station ids
    Info {
        /// Station ids, printed in the order given
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Start the JSON search API
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show catalog statistics and metrics
    Stats {
        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },
}

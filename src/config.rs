use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geo::{Coordinates, RadiusBuckets};
use crate::rerank::RankingMode;

const CONFIG_DIR: &str = ".electrifind";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where station and interaction data live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// NREL station export (relative paths resolve against the project root)
    #[serde(default = "default_stations_path")]
    pub stations_path: PathBuf,

    /// Optional `user_id,station_id,score` CSV feeding the affinity model
    #[serde(default)]
    pub interactions_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            stations_path: default_stations_path(),
            interactions_path: None,
        }
    }
}

fn default_stations_path() -> PathBuf {
    PathBuf::from("data/NREL_raw.csv")
}

/// Ranking and retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Mode a new session starts in
    #[serde(default)]
    pub default_mode: RankingMode,

    /// Weight of similarity in the `cf` blend; affinity gets `1 - alpha`
    #[serde(default = "default_blend_alpha")]
    pub blend_alpha: f32,

    /// Cap on how many of the nearest candidates get scored
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Degree thresholds for the radius categories
    #[serde(default)]
    pub radius: RadiusBuckets,

    /// Map centre used before the requester supplies a location
    #[serde(default = "default_origin")]
    pub default_origin: Coordinates,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: RankingMode::default(),
            blend_alpha: default_blend_alpha(),
            max_candidates: default_max_candidates(),
            radius: RadiusBuckets::default(),
            default_origin: default_origin(),
        }
    }
}

fn default_blend_alpha() -> f32 {
    0.7
}

fn default_max_candidates() -> usize {
    500
}

fn default_origin() -> Coordinates {
    Coordinates {
        lat: 42.30136771768067,
        lng: -83.71907280246434,
    }
}

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Local ONNX model via fastembed
    FastEmbed,
    /// Feature-hashing embedder, no model download
    Hashing,
}

impl Default for ProviderType {
    fn default() -> Self {
        Self::FastEmbed
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastEmbed => write!(f, "fastembed"),
            Self::Hashing => write!(f, "hashing"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub provider: ProviderType,

    /// Embedding model name (fastembed only)
    #[serde(default = "default_model")]
    pub model: String,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Vector width (hashing provider only)
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::default(),
            model: default_model(),
            batch_size: default_batch_size(),
            dimension: default_dimension(),
        }
    }
}

fn default_model() -> String {
    "bge-small-en-v1.5".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_dimension() -> usize {
    384
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rotating files
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also log to stderr (filtered by RUST_LOG)
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the project root)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// hourly, daily, minutely, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".electrifind/logs")
}

fn default_file_prefix() -> String {
    "electrifind.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .electrifind directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .electrifind directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Resolved path of the station CSV
    pub fn stations_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data.stations_path)
    }

    /// Resolved path of the interactions CSV, if configured
    pub fn interactions_path(&self, root: &Path) -> Option<PathBuf> {
        self.data.interactions_path.as_ref().map(|p| root.join(p))
    }
}

//! Tracing setup: a rolling log file plus optional stderr output.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const TARGET: &str = "electrifind";

/// Keeps the non-blocking writers alive. Pending log lines are flushed
/// when it drops, so hold it until `main` returns.
#[must_use = "Dropping this guard will stop logging - keep it alive for the program's lifetime"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    _stderr_guard: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// The file layer honours `config.level`; stderr honours `RUST_LOG` and
/// falls back to `electrifind=info`.
pub fn init_logging(config: &LoggingConfig, data_root: &Path) -> Result<LoggingGuard> {
    let mut file_guard = None;
    let mut stderr_guard = None;

    let file_layer = if config.enabled {
        let log_dir = resolve_log_dir(&config.directory, data_root);
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let appender = RollingFileAppender::new(
            parse_rotation(&config.rotation),
            &log_dir,
            &config.file_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(parse_level(&config.level)),
        )
    } else {
        None
    };

    let stderr_layer = if config.stderr {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        stderr_guard = Some(guard);

        Some(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_filter(env_filter_or_default()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        _stderr_guard: stderr_guard,
    })
}

fn env_filter_or_default() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{}=info", TARGET)))
}

fn resolve_log_dir(directory: &Path, data_root: &Path) -> PathBuf {
    if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        data_root.join(directory)
    }
}

fn parse_level(level: &str) -> EnvFilter {
    let level = match level.to_lowercase().as_str() {
        known @ ("trace" | "debug" | "info" | "warn" | "error") => known.to_string(),
        _ => {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
            "info".to_string()
        }
    };
    EnvFilter::new(format!("{}={}", TARGET, level))
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation.to_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "never" => Rotation::NEVER,
        _ => {
            eprintln!(
                "Warning: Unknown rotation strategy '{}', defaulting to 'daily'",
                rotation
            );
            Rotation::DAILY
        }
    }
}

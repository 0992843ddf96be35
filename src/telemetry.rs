use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level. With telemetry
/// enabled, logs are appended to `log_path` instead of stdout.
///
/// # Errors
/// Returns error if the log file or its directory can't be created, or the
/// configured level is not a valid filter
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;

    if !config.enabled {
        // Basic stdout logging only
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        return Ok(());
    }

    let expanded_path = expand_log_path(&config.log_path)?;
    let file = open_log_file(&expanded_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .init();

    tracing::info!("telemetry initialized: {}", expanded_path.display());

    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level in config: {level}")),
    }
}

/// Open `path` for appending, creating its parent directory if needed
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("failed to open log file")
}

fn expand_log_path(path: &str) -> Result<PathBuf> {
    if let Some(stripped) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(stripped))
    } else {
        Ok(PathBuf::from(path))
    }
}

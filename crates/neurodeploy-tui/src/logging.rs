use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "NEURODEPLOY_LOG";

pub fn log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

    Ok(cache_dir.join("neurodeploy").join("neurodeploy.log"))
}

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Send tracing output to a log file. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr.
pub fn init(verbose: bool) -> Result<PathBuf> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file: File = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(path)
}

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::error::ArmoryError;

pub const LOG_ENV: &str = "ARMORY_LOG";

fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("armory").join("armory.log"))
}

/// Routes tracing output to the log file; stdout and stderr belong to the panel.
pub fn init() -> Result<Option<PathBuf>, ArmoryError> {
    let Some(path) = log_path() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| ArmoryError::Logging(e.to_string()))?;

    tracing::info!(path = %path.display(), "Logging initialized");
    Ok(Some(path))
}

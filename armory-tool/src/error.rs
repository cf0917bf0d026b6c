use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmoryError {
    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Resource(#[from] armory_client::ResourceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

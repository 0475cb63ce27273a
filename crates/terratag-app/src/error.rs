//! Top-level application error.

use std::path::PathBuf;

use terratag_biome::ManifestError;
use terratag_config::ConfigError;

use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The built-in manifest could not be written.
    #[error("failed to write default rule manifest {path}: {source}")]
    WriteRules {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread could not be spawned.
    #[error("failed to start classification workers: {0}")]
    Pool(#[source] std::io::Error),

    #[error("a rule table is already installed")]
    AlreadyInstalled,

    /// Workers went idle before every region was returned.
    #[error("survey stalled with {missing} regions unaccounted for")]
    Stalled { missing: u64 },

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

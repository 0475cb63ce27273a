//! The terratag survey application: resolves directories, loads the rule
//! manifest and classifies a synthetic planet to report tag coverage.

mod error;
pub mod planet;
pub mod platform;
pub mod report;
pub mod survey;

use std::path::Path;
use std::sync::Arc;

use terratag_biome::{BiomeClassifier, LoadedRules, RuleTable, global, load_rules};

pub use error::AppError;
pub use report::CoverageReport;

/// Manifest written when the configured one does not exist.
pub const DEFAULT_RULES: &str = include_str!("../assets/default_rules.ron");

/// Loads the manifest at `path`, first writing [`DEFAULT_RULES`] there if
/// it is missing and `create_if_missing` is set.
pub fn load_or_create_rules(path: &Path, create_if_missing: bool) -> Result<LoadedRules, AppError> {
    if create_if_missing && !path.exists() {
        let write = |source| AppError::WriteRules {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write)?;
        }
        std::fs::write(path, DEFAULT_RULES).map_err(write)?;
        tracing::info!(path = %path.display(), "wrote default rule manifest");
    }
    Ok(load_rules(path)?)
}

/// Installs `table` as the process-wide table and returns a classifier
/// over it.
pub fn install_rules(table: RuleTable) -> Result<BiomeClassifier, AppError> {
    global::install(Arc::new(table)).map_err(|_| AppError::AlreadyInstalled)?;
    global::classifier().ok_or(AppError::AlreadyInstalled)
}

//! Platform directory resolution.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where terratag keeps its configuration and logs.
///
/// Defaults follow OS conventions (XDG on Linux, Known Folders on Windows,
/// Library on macOS).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformDirs {
    /// `config.ron` and the default rule manifest.
    pub config_dir: PathBuf,
    /// Log files.
    pub log_dir: PathBuf,
}

pub const APP_NAME: &str = "terratag";

impl PlatformDirs {
    /// Resolve the OS directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        let app_config = config_base.join(APP_NAME);

        let log_dir = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|base| base.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| app_config.join("logs"));

        Ok(Self {
            config_dir: app_config,
            log_dir,
        })
    }

    /// Directories for an explicit `--config` directory; logs go beneath it.
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::CreateDir`] naming the directory that failed.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_absolute_and_app_scoped() {
        // Headless CI images may not expose a config directory at all.
        let Ok(dirs) = PlatformDirs::resolve() else {
            return;
        };
        assert!(dirs.config_dir.is_absolute(), "config_dir is not absolute");
        assert!(dirs.log_dir.is_absolute(), "log_dir is not absolute");
        assert!(dirs.config_dir.ends_with(APP_NAME));
        assert!(dirs.log_dir.ends_with("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::with_config_dir(&tmp.path().join("cfg"));
        dirs.create_dirs().unwrap();

        assert!(dirs.config_dir.exists(), "config_dir was not created");
        assert!(dirs.log_dir.exists(), "log_dir was not created");
        assert_eq!(dirs.log_dir, tmp.path().join("cfg").join("logs"));
    }

    #[test]
    fn test_create_under_file_fails_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"").unwrap();

        let dirs = PlatformDirs::with_config_dir(&file);
        let err = dirs.create_dirs().unwrap_err();
        assert!(err.to_string().contains("occupied"));
    }
}

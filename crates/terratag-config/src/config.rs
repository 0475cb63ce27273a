//! Survey configuration with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Rule manifest location.
    pub rules: RulesConfig,
    /// Classification worker pool.
    pub workers: WorkerConfig,
    /// Synthetic planet survey.
    pub survey: SurveyConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Where the rule manifest lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Manifest path. Relative paths resolve against the config directory.
    pub manifest: PathBuf,
    /// Write the built-in manifest when `manifest` does not exist.
    pub create_if_missing: bool,
}

/// Worker pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker threads (0 = one per core minus two, at least one).
    pub threads: usize,
    /// Regions allowed in flight before submissions are handed back.
    pub max_concurrent: usize,
    /// Capacity of the completed-region channel.
    pub result_capacity: usize,
}

/// Synthetic planet sampled by the survey.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurveyConfig {
    /// Seed for the synthetic fields.
    pub seed: u64,
    /// Longitude columns; the grid has `resolution / 2` latitude rows.
    pub resolution: u32,
    /// Latitude rows per submitted region.
    pub rows_per_region: u32,
    /// Highest terrain above sea level in meters.
    pub max_altitude_m: f64,
    /// Deepest ocean floor below sea level in meters.
    pub max_depth_m: f64,
    /// Fraction of the surface below sea level (0.0 - 1.0).
    pub ocean_fraction: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g., "debug", "info", "terratag_biome=trace").
    pub log_level: String,
    /// Write a JSON log file in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("rules.ron"),
            create_if_missing: true,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_concurrent: 64,
            result_capacity: 128,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            resolution: 256,
            rows_per_region: 4,
            max_altitude_m: 6_000.0,
            max_depth_m: 5_000.0,
            ocean_fraction: 0.6,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl RulesConfig {
    /// The manifest path, resolved against `config_dir` when relative.
    pub fn manifest_path(&self, config_dir: &Path) -> PathBuf {
        if self.manifest.is_absolute() {
            self.manifest.clone()
        } else {
            config_dir.join(&self.manifest)
        }
    }
}

// --- Validation ---

impl Config {
    /// Rejects values the survey cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.survey.resolution < 2 {
            return invalid("survey.resolution", "must be at least 2");
        }
        if self.survey.rows_per_region == 0 {
            return invalid("survey.rows_per_region", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.survey.ocean_fraction) {
            return invalid("survey.ocean_fraction", "must be within 0.0..=1.0");
        }
        if !(self.survey.max_altitude_m >= 0.0 && self.survey.max_depth_m >= 0.0) {
            return invalid("survey.max_altitude_m", "altitude and depth must be non-negative");
        }
        if self.workers.max_concurrent == 0 {
            return invalid("workers.max_concurrent", "must be at least 1");
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-reads `config.ron`; returns `Some(new_config)` only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("resolution: 256"));
        assert!(ron_str.contains("log_level: \"info\""));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(survey: (seed: 7))").unwrap();
        assert_eq!(config.survey.seed, 7);
        assert_eq!(config.survey.resolution, 256);
        assert_eq!(config.workers, WorkerConfig::default());
    }

    #[test]
    fn test_unknown_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(render: (width: 1280))");
        assert!(result.is_ok());
    }

    #[test]
    fn test_comments_accepted() {
        let config: Config = ron::from_str("// survey settings\n(\n  // none\n)").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.survey.seed = 9001;
        config.workers.threads = 3;
        config.rules.manifest = PathBuf::from("custom/rules.ron");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.survey.resolution = 64;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.survey.resolution), Some(64));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_manifest_path_resolution() {
        let rules = RulesConfig::default();
        assert_eq!(
            rules.manifest_path(Path::new("/etc/terratag")),
            PathBuf::from("/etc/terratag/rules.ron")
        );

        let absolute = RulesConfig {
            manifest: PathBuf::from("/srv/rules.ron"),
            ..Default::default()
        };
        assert_eq!(
            absolute.manifest_path(Path::new("/etc/terratag")),
            PathBuf::from("/srv/rules.ron")
        );
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.survey.resolution = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "survey.resolution", .. })
        ));

        let mut config = Config::default();
        config.survey.ocean_fraction = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.workers.max_concurrent = 0;
        assert!(config.validate().is_err());
    }
}

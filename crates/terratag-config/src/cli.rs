//! Command-line argument parsing for the `terratag` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Classify a synthetic planet against a biome rule manifest and report
/// tag coverage.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terratag", version, about)]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rule manifest file (overrides `rules.manifest`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Worker threads (0 = automatic).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Seed for the synthetic planet.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Longitude columns of the survey grid.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Log filter (error, warn, info, debug, trace, or an EnvFilter directive).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the coverage report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.rules {
            self.rules.manifest = path.clone();
        }
        if let Some(threads) = args.threads {
            self.workers.threads = threads;
        }
        if let Some(seed) = args.seed {
            self.survey.seed = seed;
        }
        if let Some(resolution) = args.resolution {
            self.survey.resolution = resolution;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(5),
            threads: Some(2),
            rules: Some(PathBuf::from("/tmp/rules.ron")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.survey.seed, 5);
        assert_eq!(config.workers.threads, 2);
        assert_eq!(config.rules.manifest, PathBuf::from("/tmp/rules.ron"));
        // Non-overridden fields retain defaults
        assert_eq!(config.survey.resolution, 256);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "terratag",
            "--resolution",
            "64",
            "--log-level",
            "debug",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.resolution, Some(64));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json);
        assert!(args.config.is_none());
    }
}

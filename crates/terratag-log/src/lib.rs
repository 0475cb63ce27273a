//! Structured logging for terratag.
//!
//! Console output is timed from process start; debug builds can also write
//! a JSON log file. The configured level can always be overridden through
//! `RUST_LOG`.

use std::path::{Path, PathBuf};

use terratag_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "terratag.log";

/// Initialize the global tracing subscriber.
///
/// - `log_dir`: directory for the JSON log file (debug builds only)
/// - `debug_build`: enables the file layer
/// - `config`: supplies `debug.log_level` and `debug.log_to_file`
///
/// Returns the path of the log file when one was opened. Call once per
/// process; a second call panics inside `tracing-subscriber`.
///
/// ```no_run
/// use terratag_log::init_logging;
///
/// let log_dir = std::path::Path::new("./logs");
/// init_logging(Some(log_dir), cfg!(debug_assertions), None);
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let file_wanted = debug_build && config.is_none_or(|c| c.debug.log_to_file);
    if file_wanted
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return Some(log_dir.join(LOG_FILE_NAME));
    }

    subscriber.init();
    None
}

/// The filter directive taken from `config`, falling back to [`DEFAULT_FILTER`].
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(filter_directive(None), "info");
        assert!(format!("{}", default_env_filter()).contains("info"));
    }

    #[test]
    fn test_config_level_used() {
        let mut config = Config::default();
        config.debug.log_level = "debug,terratag_biome=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,terratag_biome=trace");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,terratag_biome=trace",
            "warn,terratag_biome::pool=debug",
            "error",
        ];
        for filter_str in &valid_filters {
            let result = EnvFilter::try_new(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }

    #[test]
    fn test_subsystem_filter() {
        let filter = EnvFilter::new("info,terratag_biome=debug");
        let filter_str = format!("{}", filter);
        assert!(filter_str.contains("terratag_biome=debug"));
        assert!(filter_str.contains("info"));
    }
}

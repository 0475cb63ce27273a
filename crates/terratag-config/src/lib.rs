//! Configuration for the terratag survey tool.
//!
//! Settings persist to disk as `config.ron`, accept CLI overrides via clap,
//! and tolerate missing or unknown fields so old files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RulesConfig, SurveyConfig, WorkerConfig};
pub use error::ConfigError;

//! The `terratag` binary.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use terratag_app::platform::PlatformDirs;
use terratag_app::{AppError, install_rules, load_or_create_rules, survey};
use terratag_biome::LoadedRules;
use terratag_config::{CliArgs, Config};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("terratag: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    let log_file = terratag_log::init_logging(
        Some(&dirs.log_dir),
        cfg!(debug_assertions),
        Some(&config),
    );
    tracing::info!(
        config_dir = %dirs.config_dir.display(),
        log_file = ?log_file,
        "terratag starting"
    );

    let manifest = config.rules.manifest_path(&dirs.config_dir);
    let LoadedRules { table, tags } =
        load_or_create_rules(&manifest, config.rules.create_if_missing)?;
    let classifier = install_rules(table)?;

    let report = survey::run_survey(classifier, &tags, &config)?;
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(())
}

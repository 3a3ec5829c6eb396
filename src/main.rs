//! pgdrop - CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pgdrop::cli::{Cli, Commands};
use pgdrop::config::{Config, ConfigManager};
use pgdrop::error::DropResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{} {}",
                style(format!("Error [{}]:", e.code())).red().bold(),
                e
            );
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DropResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Config is needed before logging to pick the log format
    let config = config_manager.load().await?;
    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::SystemCache(args) => pgdrop::cli::commands::system_cache(args, &config).await,
        Commands::Status => pgdrop::cli::commands::status(&config).await,
        Commands::Config(args) => {
            pgdrop::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as one level
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.saturating_add(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("pgdrop=warn"),
        1 => EnvFilter::new("pgdrop=info"),
        _ => EnvFilter::new("pgdrop=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

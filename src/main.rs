//! Strata - dependency-aware installation orchestrator
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use strata::cli::{Cli, Commands};
use strata::config::ConfigManager;
use strata::error::StrataResult;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StrataResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::locate(cli.config.clone());
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("strata=warn"),
        1 => EnvFilter::new("strata=info"),
        _ => EnvFilter::new("strata=debug"),
    };

    // Logs go to stderr, stdout carries the recorded commands
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Apply(args) => strata::cli::commands::apply(args, &config).await,
        Commands::Packages => strata::cli::commands::packages(&config).await,
        Commands::Config(args) => {
            strata::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

//! Pareto console CLI
//!
//! Command-line client for the Pareto administration API.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pareto_console::commands::{Command, TerminalPrompt};
use pareto_console::{load_config, Config};
use pareto_model::Portal;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pareto-console")]
#[command(about = "Terminal client for the Pareto administration API")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Portal to act as (overrides config file)
    #[arg(long)]
    portal: Option<Portal>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, api_url={:?}, portal={:?}, log_level={:?}",
        args.config,
        args.api_url,
        args.portal,
        args.log_level
    );

    let mut config = match &args.config {
        Some(config_path) => {
            tracing::debug!("Loading configuration from {:?}", config_path);
            match load_config(config_path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            tracing::debug!("Using default configuration");
            Config::default()
        }
    };

    if let Some(api_url) = args.api_url {
        config.api_base_url = api_url;
    }
    if let Some(portal) = args.portal {
        config.portal = portal;
    }

    match pareto_console::run(config, args.command, &mut TerminalPrompt).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

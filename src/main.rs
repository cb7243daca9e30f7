//! Trading simulator CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use trading_config::load_config;
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Interactive(RunArgs::default()));

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if cli.json_logs {
        config.logging.format = "json".to_string();
    }
    match &command {
        Commands::Interactive(args) | Commands::Single(args) | Commands::ShowConfig(args) => {
            args.apply_to(&mut config.simulation)?
        }
        Commands::Strategies => {}
    }

    // Setup logging
    let log_handle = setup_logging(&config.logging).context("Failed to setup logging")?;

    // Execute command
    match command {
        Commands::Interactive(_) => cli::commands::interactive::run(&config, log_handle).await,
        Commands::Single(_) => cli::commands::single::run(&config, log_handle).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ShowConfig(_) => cli::commands::show_config::run(&config).await,
    }
}

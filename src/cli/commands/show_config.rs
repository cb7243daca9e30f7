//! Show effective configuration command.

use anyhow::{Context, Result};
use trading_config::{to_toml, AppConfig};

use super::run_config;

pub async fn run(config: &AppConfig) -> Result<()> {
    // Same validation as a real run.
    run_config(config)?;

    let rendered = to_toml(config).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}

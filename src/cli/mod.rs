//! CLI definitions.

pub mod commands;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::warn;
use trading_config::{RunMode, SimulationSettings};
use trading_session::parse_from_dash_to;

#[derive(Parser)]
#[command(name = "tradesim")]
#[command(author, version, about = "Interactive trading strategy simulator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level, overrides the configuration file
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure and control a simulation from a command prompt (default)
    Interactive(RunArgs),
    /// Initialize, run to completion and print the score
    Single(RunArgs),
    /// List available strategies
    Strategies,
    /// Print the effective configuration as TOML
    ShowConfig(RunArgs),
}

/// Run settings overriding the configuration file.
#[derive(clap::Args, Default)]
pub struct RunArgs {
    /// Simulation period end (e.g. 2020-12-20T16:23:00)
    #[arg(long)]
    pub end: Option<String>,

    /// Number of one-minute candles
    #[arg(long)]
    pub count: Option<u32>,

    /// Seconds between ticks
    #[arg(long)]
    pub interval: Option<f64>,

    /// Starting budget
    #[arg(long)]
    pub budget: Option<u64>,

    /// Strategy number (0: buy and hold, 1: SMA crossover)
    #[arg(long)]
    pub strategy: Option<u8>,

    /// Period as YYMMDD.HHMMSS-YYMMDD.HHMMSS; sets end and count
    #[arg(long)]
    pub from_dash_to: Option<String>,

    /// Market to trade
    #[arg(long)]
    pub market: Option<String>,

    /// Poll the latest candle instead of replaying history
    #[arg(long)]
    pub live: bool,

    /// CSV file to replay instead of fetching history
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay these arguments on loaded settings.
    pub fn apply_to(&self, settings: &mut SimulationSettings) -> Result<()> {
        if let Some(end) = &self.end {
            settings.end = end.replace('T', " ");
        }
        if let Some(count) = self.count {
            settings.count = count;
        }
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        if let Some(budget) = self.budget {
            settings.budget = budget;
        }
        if let Some(strategy) = self.strategy {
            if strategy > 1 {
                warn!(strategy, "invalid strategy, replaced with 0");
                settings.strategy = 0;
            } else {
                settings.strategy = strategy;
            }
        }
        if let Some(range) = &self.from_dash_to {
            let Some((end, count)) = parse_from_dash_to(range) else {
                bail!("Invalid --from-dash-to '{range}', expected YYMMDD.HHMMSS-YYMMDD.HHMMSS");
            };
            settings.end = end.format("%Y-%m-%d %H:%M:%S").to_string();
            settings.count = count;
        }
        if let Some(market) = &self.market {
            settings.market = market.clone();
        }
        if self.live {
            settings.mode = RunMode::Live;
        }
        if let Some(path) = &self.data_file {
            settings.data_file = Some(path.clone());
        }
        Ok(())
    }
}

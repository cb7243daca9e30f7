//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory for a daily rolling log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Where market data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Replay a historical window
    #[default]
    Simulation,
    /// Poll the exchange for the latest candle
    Live,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Simulation => write!(f, "simulation"),
            RunMode::Live => write!(f, "live"),
        }
    }
}

/// Initial values of the run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// End of the simulated period, `YYYY-MM-DD HH:MM:SS`
    pub end: String,
    /// Number of one-minute candles in the period
    pub count: u32,
    /// Seconds between ticks
    pub interval: f64,
    /// Starting cash
    pub budget: u64,
    /// Strategy number
    pub strategy: u8,
    pub market: String,
    pub mode: RunMode,
    /// CSV file replacing the exchange as history source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    pub commission_ratio: Decimal,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            end: "2020-12-20 16:23:00".to_string(),
            count: 100,
            interval: 2.0,
            budget: 50000,
            strategy: 0,
            market: "KRW-BTC".to_string(),
            mode: RunMode::Simulation,
            data_file: None,
            commission_ratio: dec!(0.0005),
        }
    }
}

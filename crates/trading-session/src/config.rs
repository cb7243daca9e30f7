//! Run configuration owned by the lifecycle controller.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::PathBuf;
use trading_config::{RunMode, SimulationSettings};
use trading_data::{format_datetime, parse_datetime};
use trading_strategies::StrategyKind;
use tracing::warn;

use crate::error::ConfigRejected;

/// Default stream log severity (INFO).
pub const DEFAULT_LOG_LEVEL: i32 = 20;

/// Operator-settable configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    PeriodEnd,
    SampleCount,
    Interval,
    Budget,
    Strategy,
    LogLevel,
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigField::PeriodEnd => write!(f, "end"),
            ConfigField::SampleCount => write!(f, "count"),
            ConfigField::Interval => write!(f, "interval"),
            ConfigField::Budget => write!(f, "budget"),
            ConfigField::Strategy => write!(f, "strategy"),
            ConfigField::LogLevel => write!(f, "log level"),
        }
    }
}

/// Parameters shaping the next initialized run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// End of the simulated period
    pub period_end: NaiveDateTime,
    /// Number of one-minute candles, always > 0
    pub sample_count: u32,
    /// Seconds between ticks, always > 0
    pub interval: f64,
    /// Starting cash, always > 0
    pub budget: u64,
    pub strategy: StrategyKind,
    pub log_level: i32,
    pub market: String,
    pub mode: RunMode,
    pub data_file: Option<PathBuf>,
    pub commission_ratio: Decimal,
}

impl Default for RunConfig {
    fn default() -> Self {
        let settings = SimulationSettings::default();
        Self {
            period_end: NaiveDate::from_ymd_opt(2020, 12, 20)
                .and_then(|d| d.and_hms_opt(16, 23, 0))
                .unwrap_or_default(),
            sample_count: settings.count,
            interval: settings.interval,
            budget: settings.budget,
            strategy: StrategyKind::default(),
            log_level: DEFAULT_LOG_LEVEL,
            market: settings.market,
            mode: settings.mode,
            data_file: settings.data_file,
            commission_ratio: settings.commission_ratio,
        }
    }
}

impl RunConfig {
    /// Build the initial configuration from loaded settings.
    ///
    /// An unknown strategy number falls back to strategy 0; any other invalid
    /// value is an error.
    pub fn from_settings(settings: &SimulationSettings) -> Result<Self, ConfigRejected> {
        let mut config = Self {
            market: settings.market.clone(),
            mode: settings.mode,
            data_file: settings.data_file.clone(),
            commission_ratio: settings.commission_ratio,
            ..Self::default()
        };

        config.apply(ConfigField::PeriodEnd, &settings.end)?;
        config.apply(ConfigField::SampleCount, &settings.count.to_string())?;
        config.apply(ConfigField::Interval, &settings.interval.to_string())?;
        config.apply(ConfigField::Budget, &settings.budget.to_string())?;

        match StrategyKind::from_number(settings.strategy) {
            Some(kind) => config.strategy = kind,
            None => warn!(
                strategy = settings.strategy,
                "invalid strategy, replaced with 0"
            ),
        }

        Ok(config)
    }

    /// Parse and assign one field.
    ///
    /// On rejection the field keeps its previous value.
    pub fn apply(&mut self, field: ConfigField, raw: &str) -> Result<(), ConfigRejected> {
        let value = raw.trim();
        let reject = |reason: &str| ConfigRejected::new(field, raw, reason);

        match field {
            ConfigField::PeriodEnd => {
                self.period_end =
                    parse_datetime(value).ok_or_else(|| reject("not a valid date time"))?;
            }
            ConfigField::SampleCount => {
                let count: u32 = value
                    .parse()
                    .map_err(|_| reject("not a positive integer"))?;
                if count == 0 {
                    return Err(reject("must be greater than 0"));
                }
                self.sample_count = count;
            }
            ConfigField::Interval => {
                let interval: f64 = value.parse().map_err(|_| reject("not a number"))?;
                if !interval.is_finite() || interval <= 0.0 {
                    return Err(reject("must be greater than 0"));
                }
                self.interval = interval;
            }
            ConfigField::Budget => {
                let budget: u64 = value
                    .parse()
                    .map_err(|_| reject("not a positive integer"))?;
                if budget == 0 {
                    return Err(reject("must be greater than 0"));
                }
                self.budget = budget;
            }
            ConfigField::Strategy => {
                self.strategy =
                    StrategyKind::from_code(value).ok_or_else(|| reject("expected 0 or 1"))?;
            }
            ConfigField::LogLevel => {
                self.log_level = value.parse().map_err(|_| reject("not an integer"))?;
            }
        }

        Ok(())
    }

    /// Period end in normalized `YYYY-MM-DD HH:MM:SS` form.
    pub fn period_end_text(&self) -> String {
        format_datetime(&self.period_end)
    }

    /// Budget as a decimal amount.
    pub fn budget_decimal(&self) -> Decimal {
        Decimal::from(self.budget)
    }
}

impl std::fmt::Display for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "end: {}", self.period_end_text())?;
        writeln!(f, "count: {}", self.sample_count)?;
        writeln!(f, "interval: {}", self.interval)?;
        writeln!(f, "budget: {}", self.budget)?;
        writeln!(f, "strategy: {} ({})", self.strategy.code(), self.strategy)?;
        write!(f, "market: {} [{}]", self.market, self.mode)
    }
}

/// Parse a `YYMMDD.HHMMSS-YYMMDD.HHMMSS` range into its end and its length
/// in whole minutes. The time parts are optional.
pub fn parse_from_dash_to(raw: &str) -> Option<(NaiveDateTime, u32)> {
    let (from, to) = raw.trim().split_once('-')?;
    let start = parse_compact(from)?;
    let end = parse_compact(to)?;

    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return None;
    }
    Some((end, u32::try_from(minutes).ok()?))
}

fn parse_compact(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.contains('.') {
        NaiveDateTime::parse_from_str(raw, "%y%m%d.%H%M%S").ok()
    } else {
        NaiveDate::parse_from_str(raw, "%y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0)
    }
}

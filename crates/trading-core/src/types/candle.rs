//! One-minute OHLCV candle records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single time-bucketed market observation.
///
/// Prices are kept as `f64` for fast indicator calculations; conversion to
/// `Decimal` happens at the order boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Market identifier, e.g. `KRW-BTC`
    pub market: String,
    /// Candle start time in UTC
    pub date_time_utc: NaiveDateTime,
    /// Candle start time in exchange local time
    pub date_time_local: NaiveDateTime,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing (last traded) price
    pub close: f64,
    /// Accumulated traded value within the candle
    pub acc_price: f64,
    /// Accumulated traded volume within the candle
    pub acc_volume: f64,
}

//! Market data providers.
//!
//! - [`UpbitDataProvider`]: latest one-minute candle from the Upbit REST API
//! - [`SimulationDataProvider`]: replays a historical window candle by candle
//! - [`CsvCandleSource`]: loads candles from a CSV file for offline runs

mod csv_source;
mod simulation;
mod time;
mod upbit;

pub use csv_source::CsvCandleSource;
pub use simulation::{HistorySource, SimulationDataProvider};
pub use time::{format_datetime, parse_datetime};
pub use upbit::UpbitDataProvider;


//! CSV candle source.

use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use trading_core::error::DataError;
use trading_core::types::Candle;

use crate::time::parse_datetime;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
    #[serde(alias = "AccPrice", alias = "acc_price", default)]
    acc_price: Option<f64>,
}

/// CSV source of one-minute candles for offline simulation.
pub struct CsvCandleSource {
    path: PathBuf,
    market: String,
}

impl CsvCandleSource {
    /// Create a new CSV source.
    pub fn new(path: &Path, market: &str) -> Result<Self, DataError> {
        if !path.exists() {
            return Err(DataError::Io(format!(
                "data file '{}' does not exist",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            market: market.to_string(),
        })
    }

    /// Load all candles, oldest first.
    pub fn load_all(&self) -> Result<Vec<Candle>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| DataError::Io(e.to_string()))?;

        let mut candles = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::Parse(e.to_string()))?;
            candles.push(self.to_candle(record)?);
        }

        candles.sort_by_key(|c| c.date_time_utc);

        Ok(candles)
    }

    fn to_candle(&self, record: CsvRecord) -> Result<Candle, DataError> {
        let date_time = parse_datetime(&record.date)
            .ok_or_else(|| DataError::Parse(format!("Could not parse date: {}", record.date)))?;

        Ok(Candle {
            market: self.market.clone(),
            date_time_utc: date_time,
            date_time_local: date_time,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            acc_price: record
                .acc_price
                .unwrap_or(record.close * record.volume),
            acc_volume: record.volume,
        })
    }
}

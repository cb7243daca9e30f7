//! Historical replay provider for simulations.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::info;
use trading_core::error::DataError;
use trading_core::traits::DataProvider;
use trading_core::types::Candle;

use crate::csv_source::CsvCandleSource;
use crate::upbit::UpbitDataProvider;

/// Where the simulation window comes from.
pub enum HistorySource {
    /// Fetch from the Upbit history endpoint.
    Upbit(UpbitDataProvider),
    /// Load from a CSV file.
    Csv(PathBuf),
    /// Use these candles as-is.
    Candles(Vec<Candle>),
}

/// Replays the `count` candles that closed before `end`, one per call.
///
/// `end` is exclusive for every source, matching the Upbit `to` parameter.
///
/// The window is loaded lazily on the first [`get_info`](DataProvider::get_info)
/// so construction never touches the network. A failed load is retried on
/// the next call.
pub struct SimulationDataProvider {
    source: HistorySource,
    market: String,
    end: NaiveDateTime,
    count: u32,
    candles: VecDeque<Candle>,
    loaded: bool,
}

impl SimulationDataProvider {
    /// Create a new replay provider.
    pub fn new(source: HistorySource, market: &str, end: NaiveDateTime, count: u32) -> Self {
        Self {
            source,
            market: market.to_string(),
            end,
            count,
            candles: VecDeque::new(),
            loaded: false,
        }
    }

    /// Number of candles left to replay (zero before loading).
    pub fn remaining(&self) -> usize {
        self.candles.len()
    }

    async fn load(&mut self) -> Result<(), DataError> {
        let candles = match &mut self.source {
            HistorySource::Upbit(upbit) => {
                upbit.set_market(&self.market);
                upbit.fetch_history(self.end, self.count).await?
            }
            HistorySource::Csv(path) => {
                let all = CsvCandleSource::new(path, &self.market)?.load_all()?;
                window(all, self.end, self.count)
            }
            HistorySource::Candles(candles) => std::mem::take(candles),
        };

        info!(
            market = %self.market,
            end = %self.end,
            requested = self.count,
            loaded = candles.len(),
            "simulation data loaded"
        );

        self.candles = candles.into();
        self.loaded = true;
        Ok(())
    }
}

/// Keep the last `count` candles strictly before `end`.
fn window(candles: Vec<Candle>, end: NaiveDateTime, count: u32) -> Vec<Candle> {
    let mut eligible: Vec<Candle> = candles
        .into_iter()
        .filter(|c| c.date_time_utc < end)
        .collect();
    let skip = eligible.len().saturating_sub(count as usize);
    eligible.drain(..skip);
    eligible
}

#[async_trait]
impl DataProvider for SimulationDataProvider {
    async fn get_info(&mut self) -> Result<Candle, DataError> {
        if !self.loaded {
            self.load().await?;
        }
        self.candles.pop_front().ok_or(DataError::Exhausted)
    }

    fn set_market(&mut self, market: &str) {
        self.market = market.to_string();
    }

    fn name(&self) -> &str {
        "Simulation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn minute_candles(n: usize) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let at = start + Duration::minutes(i as i64);
                let price = 100.0 + i as f64;
                Candle {
                    market: "KRW-BTC".to_string(),
                    date_time_utc: at,
                    date_time_local: at,
                    open: price,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    acc_price: price,
                    acc_volume: 1.0,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_replays_then_exhausts() {
        let candles = minute_candles(3);
        let end = candles[2].date_time_utc;
        let mut provider =
            SimulationDataProvider::new(HistorySource::Candles(candles), "KRW-BTC", end, 3);

        assert_eq!(provider.get_info().await.unwrap().close, 100.0);
        assert_eq!(provider.remaining(), 2);
        assert_eq!(provider.get_info().await.unwrap().close, 101.0);
        assert_eq!(provider.get_info().await.unwrap().close, 102.0);
        assert_eq!(provider.get_info().await, Err(DataError::Exhausted));
    }

    #[test]
    fn test_window_keeps_latest_before_end() {
        let candles = minute_candles(10);
        let end = candles[7].date_time_utc;

        let selected = window(candles, end, 3);
        let closes: Vec<f64> = selected.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![104.0, 105.0, 106.0]);
    }

    #[tokio::test]
    async fn test_csv_window_excludes_end_minute() {
        let path = std::env::temp_dir().join(format!("window-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "timestamp,open,high,low,close,volume\n\
             2020-12-20 16:00:00,100,101,99,100,1\n\
             2020-12-20 16:01:00,101,102,100,101,1\n\
             2020-12-20 16:02:00,102,103,101,102,1\n",
        )
        .unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 2, 0)
            .unwrap();
        let mut provider =
            SimulationDataProvider::new(HistorySource::Csv(path.clone()), "KRW-BTC", end, 5);

        assert_eq!(provider.get_info().await.unwrap().close, 100.0);
        assert_eq!(provider.get_info().await.unwrap().close, 101.0);
        assert_eq!(provider.get_info().await, Err(DataError::Exhausted));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_csv_is_retried_error() {
        let end = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        let mut provider = SimulationDataProvider::new(
            HistorySource::Csv(PathBuf::from("/nonexistent/history.csv")),
            "KRW-BTC",
            end,
            10,
        );

        assert!(matches!(provider.get_info().await, Err(DataError::Io(_))));
        assert!(matches!(provider.get_info().await, Err(DataError::Io(_))));
    }
}

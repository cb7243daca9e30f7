//! Upbit REST candle provider.
//!
//! Uses the public candle endpoint, no authentication required.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use trading_core::error::DataError;
use trading_core::traits::DataProvider;
use trading_core::types::Candle;

use crate::time::format_datetime;

const CANDLE_URL: &str = "https://api.upbit.com/v1/candles/minutes/1";
const DEFAULT_MARKET: &str = "KRW-BTC";
/// Maximum candles the endpoint returns per call.
const MAX_PAGE: u32 = 200;
const PAGE_DELAY: Duration = Duration::from_millis(120);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Candle as returned by the Upbit API.
#[derive(Debug, Deserialize)]
struct UpbitCandle {
    market: String,
    candle_date_time_utc: NaiveDateTime,
    candle_date_time_kst: NaiveDateTime,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_price: f64,
    candle_acc_trade_volume: f64,
}

impl From<UpbitCandle> for Candle {
    fn from(raw: UpbitCandle) -> Self {
        Self {
            market: raw.market,
            date_time_utc: raw.candle_date_time_utc,
            date_time_local: raw.candle_date_time_kst,
            open: raw.opening_price,
            high: raw.high_price,
            low: raw.low_price,
            close: raw.trade_price,
            acc_price: raw.candle_acc_trade_price,
            acc_volume: raw.candle_acc_trade_volume,
        }
    }
}

/// Parse an API response body. The API returns candles newest first.
fn parse_candles(body: &str) -> Result<Vec<Candle>, DataError> {
    let raw: Vec<UpbitCandle> = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "invalid data for candle info");
        DataError::Parse(e.to_string())
    })?;
    Ok(raw.into_iter().map(Candle::from).collect())
}

/// Provides real-time one-minute candles from Upbit.
pub struct UpbitDataProvider {
    client: reqwest::Client,
    base_url: String,
    market: String,
}

impl UpbitDataProvider {
    /// Create a provider for the given market.
    pub fn new(market: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: CANDLE_URL.to_string(),
            market: market.to_string(),
        }
    }

    /// Override the endpoint URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Currently queried market.
    pub fn market(&self) -> &str {
        &self.market
    }

    async fn fetch(&self, count: u32, to: Option<NaiveDateTime>) -> Result<Vec<Candle>, DataError> {
        let mut query = vec![
            ("market", self.market.clone()),
            ("count", count.to_string()),
        ];
        if let Some(to) = to {
            query.push(("to", format_datetime(&to)));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error = %e, market = %self.market, "candle request failed");
                DataError::Fetch(e.to_string())
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| DataError::Fetch(e.to_string()))?;

        parse_candles(&body)
    }

    /// Fetch `count` candles ending before `end` (UTC), oldest first.
    ///
    /// Pages backwards through the API in chunks of at most 200 candles.
    pub async fn fetch_history(
        &self,
        end: NaiveDateTime,
        count: u32,
    ) -> Result<Vec<Candle>, DataError> {
        let mut candles: Vec<Candle> = Vec::with_capacity(count.min(MAX_PAGE) as usize);
        let mut to = end;
        let mut remaining = count;

        while remaining > 0 {
            let page_size = remaining.min(MAX_PAGE);
            let page = self.fetch(page_size, Some(to)).await?;
            debug!(requested = page_size, received = page.len(), to = %to, "fetched history page");

            let Some(oldest) = page.last() else {
                break;
            };
            to = oldest.date_time_utc;
            remaining = remaining.saturating_sub(page.len() as u32);
            candles.extend(page);

            if remaining > 0 {
                tokio::time::sleep(PAGE_DELAY).await;
            }
        }

        candles.reverse();
        Ok(candles)
    }
}

impl Default for UpbitDataProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MARKET)
    }
}

#[async_trait]
impl DataProvider for UpbitDataProvider {
    async fn get_info(&mut self) -> Result<Candle, DataError> {
        let mut candles = self.fetch(1, None).await?;
        if candles.is_empty() {
            return Err(DataError::Parse("empty candle list".to_string()));
        }
        Ok(candles.swap_remove(0))
    }

    fn set_market(&mut self, market: &str) {
        self.market = market.to_string();
    }

    fn name(&self) -> &str {
        "Upbit"
    }
}

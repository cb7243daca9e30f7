//! Data provider trait definition.

use crate::error::DataError;
use crate::types::Candle;
use async_trait::async_trait;

/// Trait for market data providers.
///
/// A provider hands out the next candle for its market each time it is
/// asked. Live providers return the latest candle from the exchange;
/// simulation providers replay a historical window one candle at a time and
/// report [`DataError::Exhausted`] once the window is consumed.
#[async_trait]
pub trait DataProvider: Send {
    /// Fetch the next candle.
    async fn get_info(&mut self) -> Result<Candle, DataError>;

    /// Change the market to query.
    fn set_market(&mut self, _market: &str) {}

    /// Get the provider name.
    fn name(&self) -> &str;
}

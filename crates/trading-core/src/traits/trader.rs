//! Trader trait definition.

use crate::error::BrokerError;
use crate::types::{AccountInfo, Candle, OrderRequest, TradeResult};
use async_trait::async_trait;

/// Trait for order execution.
///
/// Traders execute strategy requests and keep track of the account.
#[async_trait]
pub trait Trader: Send {
    /// Observe the latest candle. Simulated traders fill against it.
    fn update_market(&mut self, _candle: &Candle) {}

    /// Execute a request.
    ///
    /// Requests that cannot be filled produce a rejected [`TradeResult`];
    /// `Err` is reserved for failures of the trader itself.
    async fn send_request(&mut self, request: &OrderRequest) -> Result<TradeResult, BrokerError>;

    /// Get the current account snapshot.
    async fn get_account_info(&self) -> Result<AccountInfo, BrokerError>;

    /// Get the trader name.
    fn name(&self) -> &str;
}

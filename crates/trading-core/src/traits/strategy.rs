//! Strategy trait definitions.

use crate::types::{Candle, OrderRequest, TradeResult};
use rust_decimal::Decimal;

/// Core strategy trait.
///
/// The execution engine feeds each new candle to the strategy, asks it for
/// order requests, and reports the trader's results back.
pub trait Strategy: Send {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Prepare the strategy for a new run with the given budget.
    fn initialize(&mut self, budget: Decimal);

    /// Process a new candle.
    fn update_trading_info(&mut self, candle: &Candle);

    /// Produce the order requests for the latest candle, if any.
    fn get_request(&mut self) -> Vec<OrderRequest>;

    /// Called with the outcome of every request sent to the trader.
    fn update_result(&mut self, result: &TradeResult);

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

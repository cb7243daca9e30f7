//! Order requests and trade results.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order request emitted by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Unique request ID
    pub id: Uuid,
    /// Market identifier
    pub market: String,
    /// Buy or sell
    pub side: Side,
    /// Limit price
    pub price: Decimal,
    /// Quantity of the base asset
    pub amount: Decimal,
    /// Candle time the request was made for
    pub date_time: NaiveDateTime,
}

impl OrderRequest {
    /// Create a buy request.
    pub fn buy(
        market: impl Into<String>,
        price: Decimal,
        amount: Decimal,
        date_time: NaiveDateTime,
    ) -> Self {
        Self::new(market, Side::Buy, price, amount, date_time)
    }

    /// Create a sell request.
    pub fn sell(
        market: impl Into<String>,
        price: Decimal,
        amount: Decimal,
        date_time: NaiveDateTime,
    ) -> Self {
        Self::new(market, Side::Sell, price, amount, date_time)
    }

    fn new(
        market: impl Into<String>,
        side: Side,
        price: Decimal,
        amount: Decimal,
        date_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market: market.into(),
            side,
            price,
            amount,
            date_time,
        }
    }

    /// Notional value (price * amount).
    pub fn notional(&self) -> Decimal {
        self.price * self.amount
    }
}

/// Outcome of a request sent to a trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Completely filled
    Filled,
    /// Not filled (price out of range or insufficient funds)
    Rejected,
}

/// Result of an executed (or rejected) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    /// ID of the originating request
    pub request_id: Uuid,
    /// Market identifier
    pub market: String,
    /// Buy or sell
    pub side: Side,
    /// Execution price
    pub price: Decimal,
    /// Executed quantity
    pub amount: Decimal,
    /// Commission charged
    pub fee: Decimal,
    /// Fill status
    pub status: TradeStatus,
    /// Human readable note
    pub message: String,
    /// Candle time of execution
    pub date_time: NaiveDateTime,
}

impl TradeResult {
    /// Check if the result represents an actual fill.
    pub fn is_filled(&self) -> bool {
        self.status == TradeStatus::Filled
    }

    /// Notional value of the fill.
    pub fn notional(&self) -> Decimal {
        self.price * self.amount
    }
}

impl std::fmt::Display for TradeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {} {} @ {} (fee {}) {:?}",
            self.date_time, self.market, self.side, self.amount, self.price, self.fee, self.status
        )
    }
}

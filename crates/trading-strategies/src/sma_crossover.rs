//! SMA Crossover Strategy.
//!
//! Buys with all available cash when the short SMA crosses above the long
//! SMA, and sells the whole position when it crosses back below.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use trading_core::traits::Strategy;
use trading_core::types::{Candle, OrderRequest, Side, TradeResult};

use crate::{affordable_amount, to_price, StrategyError};

/// Configuration for the SMA Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaCrossoverConfig {
    /// Short moving average period
    pub short_period: usize,
    /// Long moving average period
    pub long_period: usize,
    /// Smallest order value worth sending
    pub min_order_value: Decimal,
    /// Commission ratio assumed when sizing orders
    pub commission_ratio: Decimal,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 40,
            min_order_value: dec!(5000),
            commission_ratio: dec!(0.0005),
        }
    }
}

impl SmaCrossoverConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.short_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short period must be greater than 0".into(),
            ));
        }
        if self.short_period >= self.long_period {
            return Err(StrategyError::InvalidConfig(
                "Short period must be less than long period".into(),
            ));
        }
        Ok(())
    }
}

/// Simple moving average of the last `period` values.
fn sma(values: &VecDeque<f64>, period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// SMA Crossover Strategy.
pub struct SmaCrossoverStrategy {
    config: SmaCrossoverConfig,
    closes: VecDeque<f64>,
    prev_short_above: Option<bool>,
    crossed: Option<Side>,
    balance: Decimal,
    asset_amount: Decimal,
    last_candle: Option<Candle>,
}

impl SmaCrossoverStrategy {
    /// Create a new SMA Crossover strategy.
    pub fn new(config: SmaCrossoverConfig) -> Self {
        let capacity = config.long_period;
        Self {
            config,
            closes: VecDeque::with_capacity(capacity),
            prev_short_above: None,
            crossed: None,
            balance: Decimal::ZERO,
            asset_amount: Decimal::ZERO,
            last_candle: None,
        }
    }

    /// Asset quantity the strategy believes it holds.
    pub fn asset_amount(&self) -> Decimal {
        self.asset_amount
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        "SMA Crossover"
    }

    fn description(&self) -> &str {
        "Trades short/long simple moving average crossovers"
    }

    fn initialize(&mut self, budget: Decimal) {
        self.balance = budget;
        self.asset_amount = Decimal::ZERO;
        self.closes.clear();
        self.prev_short_above = None;
        self.crossed = None;
        self.last_candle = None;
    }

    fn update_trading_info(&mut self, candle: &Candle) {
        if self.closes.len() == self.config.long_period {
            self.closes.pop_front();
        }
        self.closes.push_back(candle.close);
        self.last_candle = Some(candle.clone());
        self.crossed = None;

        let (Some(short), Some(long)) = (
            sma(&self.closes, self.config.short_period),
            sma(&self.closes, self.config.long_period),
        ) else {
            return;
        };

        let short_above = short > long;
        if let Some(prev) = self.prev_short_above {
            if short_above && !prev {
                self.crossed = Some(Side::Buy);
            } else if !short_above && prev && short < long {
                self.crossed = Some(Side::Sell);
            }
        }
        self.prev_short_above = Some(short_above);

        debug!(short, long, crossed = ?self.crossed, "sma updated");
    }

    fn get_request(&mut self) -> Vec<OrderRequest> {
        let (Some(candle), Some(side)) = (&self.last_candle, self.crossed) else {
            return Vec::new();
        };
        let Some(price) = to_price(candle.close) else {
            return Vec::new();
        };

        let request = match side {
            Side::Buy => {
                if self.balance < self.config.min_order_value {
                    return Vec::new();
                }
                let amount = affordable_amount(self.balance, price, self.config.commission_ratio);
                if amount <= Decimal::ZERO {
                    return Vec::new();
                }
                OrderRequest::buy(candle.market.clone(), price, amount, candle.date_time_utc)
            }
            Side::Sell => {
                if self.asset_amount <= Decimal::ZERO {
                    return Vec::new();
                }
                OrderRequest::sell(
                    candle.market.clone(),
                    price,
                    self.asset_amount,
                    candle.date_time_utc,
                )
            }
        };

        self.crossed = None;
        vec![request]
    }

    fn update_result(&mut self, result: &TradeResult) {
        if !result.is_filled() {
            return;
        }
        match result.side {
            Side::Buy => {
                self.balance -= result.notional() + result.fee;
                self.asset_amount += result.amount;
            }
            Side::Sell => {
                self.balance += result.notional() - result.fee;
                self.asset_amount -= result.amount.min(self.asset_amount);
            }
        }
    }
}

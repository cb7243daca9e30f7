//! Buy and Hold Strategy.
//!
//! Spends the budget in equal installments at the latest close, one
//! installment per candle, and never sells.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trading_core::traits::Strategy;
use trading_core::types::{Candle, OrderRequest, Side, TradeResult};

use crate::{affordable_amount, to_price, StrategyError};

/// Configuration for the Buy and Hold strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyAndHoldConfig {
    /// Number of installments the budget is split into
    pub installments: u32,
    /// Smallest order value worth sending
    pub min_order_value: Decimal,
    /// Commission ratio assumed when sizing orders
    pub commission_ratio: Decimal,
}

impl Default for BuyAndHoldConfig {
    fn default() -> Self {
        Self {
            installments: 5,
            min_order_value: dec!(5000),
            commission_ratio: dec!(0.0005),
        }
    }
}

impl BuyAndHoldConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.installments == 0 {
            return Err(StrategyError::InvalidConfig(
                "Installments must be greater than 0".into(),
            ));
        }
        if self.commission_ratio < Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Commission ratio must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Buy and Hold Strategy.
pub struct BuyAndHoldStrategy {
    config: BuyAndHoldConfig,
    balance: Decimal,
    installment: Decimal,
    last_candle: Option<Candle>,
}

impl BuyAndHoldStrategy {
    /// Create a new Buy and Hold strategy.
    pub fn new(config: BuyAndHoldConfig) -> Self {
        Self {
            config,
            balance: Decimal::ZERO,
            installment: Decimal::ZERO,
            last_candle: None,
        }
    }

    /// Cash the strategy believes is still available.
    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "Buy and Hold"
    }

    fn description(&self) -> &str {
        "Buys in equal installments at the latest price and holds"
    }

    fn initialize(&mut self, budget: Decimal) {
        self.balance = budget;
        self.installment = budget / Decimal::from(self.config.installments.max(1));
        self.last_candle = None;
    }

    fn update_trading_info(&mut self, candle: &Candle) {
        self.last_candle = Some(candle.clone());
    }

    fn get_request(&mut self) -> Vec<OrderRequest> {
        let Some(candle) = &self.last_candle else {
            return Vec::new();
        };
        let Some(price) = to_price(candle.close) else {
            return Vec::new();
        };

        let target = self.installment.min(self.balance);
        if target < self.config.min_order_value {
            return Vec::new();
        }

        let amount = affordable_amount(target, price, self.config.commission_ratio);
        if amount <= Decimal::ZERO {
            return Vec::new();
        }

        debug!(price = %price, amount = %amount, "buy and hold installment");
        vec![OrderRequest::buy(
            candle.market.clone(),
            price,
            amount,
            candle.date_time_utc,
        )]
    }

    fn update_result(&mut self, result: &TradeResult) {
        if !result.is_filled() {
            return;
        }
        match result.side {
            Side::Buy => self.balance -= result.notional() + result.fee,
            Side::Sell => self.balance += result.notional() - result.fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use trading_core::types::TradeStatus;

    fn candle(close: f64) -> Candle {
        let at = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        Candle {
            market: "KRW-BTC".to_string(),
            date_time_utc: at,
            date_time_local: at,
            open: close,
            high: close,
            low: close,
            close,
            acc_price: 0.0,
            acc_volume: 0.0,
        }
    }

    fn fill(request: &OrderRequest) -> TradeResult {
        TradeResult {
            request_id: request.id,
            market: request.market.clone(),
            side: request.side,
            price: request.price,
            amount: request.amount,
            fee: request.notional() * dec!(0.0005),
            status: TradeStatus::Filled,
            message: "success".to_string(),
            date_time: request.date_time,
        }
    }

    #[test]
    fn test_no_request_without_data() {
        let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldConfig::default());
        strategy.initialize(dec!(50000));
        assert!(strategy.get_request().is_empty());
    }

    #[test]
    fn test_buys_in_installments_until_budget_spent() {
        let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldConfig::default());
        strategy.initialize(dec!(50000));

        let mut filled = 0;
        for _ in 0..10 {
            strategy.update_trading_info(&candle(1000.0));
            let requests = strategy.get_request();
            for request in &requests {
                assert_eq!(request.side, Side::Buy);
                assert!(request.notional() <= dec!(10000));
                strategy.update_result(&fill(request));
                filled += 1;
            }
        }

        assert_eq!(filled, 5);
        assert!(strategy.balance() >= Decimal::ZERO);
        assert!(strategy.balance() < dec!(5000));
    }

    #[test]
    fn test_rejected_result_keeps_balance() {
        let mut strategy = BuyAndHoldStrategy::new(BuyAndHoldConfig::default());
        strategy.initialize(dec!(50000));
        strategy.update_trading_info(&candle(1000.0));

        let request = strategy.get_request().remove(0);
        let mut result = fill(&request);
        result.status = TradeStatus::Rejected;
        strategy.update_result(&result);

        assert_eq!(strategy.balance(), dec!(50000));
    }

    #[test]
    fn test_validate() {
        let config = BuyAndHoldConfig {
            installments: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BuyAndHoldConfig::default().validate().is_ok());
    }
}

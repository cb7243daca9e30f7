//! Trading strategy implementations.
//!
//! This crate provides the strategies selectable from the simulator:
//! - Buy and Hold (strategy 0)
//! - SMA Crossover (strategy 1)

mod buy_and_hold;
mod registry;
mod sma_crossover;

pub use buy_and_hold::{BuyAndHoldConfig, BuyAndHoldStrategy};
pub use registry::{StrategyInfo, StrategyKind, StrategyRegistry};
pub use sma_crossover::{SmaCrossoverConfig, SmaCrossoverStrategy};

use rust_decimal::prelude::*;
use thiserror::Error;

/// Strategy configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Convert a candle price to a decimal order price.
pub(crate) fn to_price(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).filter(|p| *p > Decimal::ZERO)
}

/// Largest amount purchasable with `budget` at `price` after commission,
/// truncated to 8 decimal places.
pub(crate) fn affordable_amount(budget: Decimal, price: Decimal, commission: Decimal) -> Decimal {
    let unit_cost = price * (Decimal::ONE + commission);
    if unit_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (budget / unit_cost).round_dp_with_strategy(8, RoundingStrategy::ToZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_affordable_amount_truncates() {
        let amount = affordable_amount(dec!(10000), dec!(3), dec!(0));
        assert_eq!(amount, dec!(3333.33333333));

        let amount = affordable_amount(dec!(10005), dec!(10000), dec!(0.0005));
        assert_eq!(amount, dec!(1));
    }

    #[test]
    fn test_to_price_rejects_non_positive() {
        assert!(to_price(0.0).is_none());
        assert!(to_price(-1.0).is_none());
        assert!(to_price(f64::NAN).is_none());
        assert_eq!(to_price(1500.0), Some(dec!(1500)));
    }
}

//! Account snapshots reported by traders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time view of a trading account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Available cash
    pub balance: Decimal,
    /// Held asset quantity (zero when flat)
    pub asset_amount: Decimal,
    /// Average entry price of the held asset
    pub asset_avg_price: Decimal,
    /// Latest market price known to the trader
    pub quote: Decimal,
}

impl AccountInfo {
    /// Create a flat account holding only cash.
    pub fn cash_only(balance: Decimal) -> Self {
        Self {
            balance,
            asset_amount: Decimal::ZERO,
            asset_avg_price: Decimal::ZERO,
            quote: Decimal::ZERO,
        }
    }

    /// Market value of the held asset.
    pub fn asset_value(&self) -> Decimal {
        self.asset_amount * self.quote
    }

    /// Cash plus asset value.
    pub fn total_value(&self) -> Decimal {
        self.balance + self.asset_value()
    }

    /// Check if the account holds no asset.
    pub fn is_flat(&self) -> bool {
        self.asset_amount == Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_value() {
        let mut account = AccountInfo::cash_only(dec!(10000));
        assert!(account.is_flat());
        assert_eq!(account.total_value(), dec!(10000));

        account.asset_amount = dec!(2);
        account.quote = dec!(1500);
        assert_eq!(account.asset_value(), dec!(3000));
        assert_eq!(account.total_value(), dec!(13000));
    }
}

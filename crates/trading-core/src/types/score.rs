//! Score reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Performance snapshot of a run, as computed by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Budget the run started with
    pub start_budget: Decimal,
    /// Cash currently available
    pub balance: Decimal,
    /// Market value of held assets
    pub asset_value: Decimal,
    /// Cash plus asset value
    pub total_value: Decimal,
    /// Return against the starting budget, in percent
    pub cumulative_return_pct: Decimal,
    /// Market price change from the first to the latest candle, in percent
    pub price_change_pct: Decimal,
    /// Maximum drawdown of the recorded equity curve, in percent
    pub max_drawdown_pct: Decimal,
    /// Number of filled trades
    pub trade_count: usize,
    /// Number of candles processed
    pub candles_processed: usize,
}

impl ScoreReport {
    /// Report for a run that has not processed anything yet.
    pub fn empty(start_budget: Decimal) -> Self {
        Self {
            start_budget,
            balance: start_budget,
            asset_value: Decimal::ZERO,
            total_value: start_budget,
            cumulative_return_pct: Decimal::ZERO,
            price_change_pct: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            trade_count: 0,
            candles_processed: 0,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Start Budget:        {:.2}\n", self.start_budget));
        s.push_str(&format!("  Balance:             {:.2}\n", self.balance));
        s.push_str(&format!("  Asset Value:         {:.2}\n", self.asset_value));
        s.push_str(&format!("  Total Value:         {:.2}\n", self.total_value));
        s.push_str(&format!(
            "  Cumulative Return:   {:.2}%\n",
            self.cumulative_return_pct
        ));
        s.push_str(&format!("  Price Change:        {:.2}%\n", self.price_change_pct));
        s.push_str(&format!("  Max Drawdown:        {:.2}%\n", self.max_drawdown_pct));
        s.push_str(&format!("  Trades:              {}\n", self.trade_count));
        s.push_str(&format!("  Candles Processed:   {}\n", self.candles_processed));
        s.push_str("───────────────────────────────────────────────────────────");

        s
    }
}

impl std::fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_summary() {
        let mut report = ScoreReport::empty(dec!(50000));
        report.total_value = dec!(55000);
        report.cumulative_return_pct = dec!(10);

        let summary = report.summary();
        assert!(summary.contains("Cumulative Return"));
        assert!(summary.contains("10.00%"));
        assert!(summary.contains("55000.00"));
    }
}

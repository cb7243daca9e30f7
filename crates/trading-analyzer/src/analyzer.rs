//! Trading analyzer.

use chrono::NaiveDateTime;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trading_core::types::{AccountInfo, Candle, OrderRequest, ScoreReport, TradeResult};

/// Account snapshot taken after a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicRecord {
    /// Candle time of the snapshot
    pub date_time: Option<NaiveDateTime>,
    /// Account state
    pub account: AccountInfo,
    /// Cash plus asset value
    pub total_value: Decimal,
}

/// Records everything that happens during a run and scores it.
#[derive(Debug, Clone)]
pub struct Analyzer {
    start_budget: Decimal,
    first_candle: Option<Candle>,
    last_candle: Option<Candle>,
    candles_processed: usize,
    requests: Vec<OrderRequest>,
    results: Vec<TradeResult>,
    records: Vec<PeriodicRecord>,
    peak_value: Decimal,
    max_drawdown_pct: Decimal,
}

impl Analyzer {
    /// Create a new analyzer for a run with the given budget.
    pub fn new(start_budget: Decimal) -> Self {
        Self {
            start_budget,
            first_candle: None,
            last_candle: None,
            candles_processed: 0,
            requests: Vec::new(),
            results: Vec::new(),
            records: Vec::new(),
            peak_value: start_budget,
            max_drawdown_pct: Decimal::ZERO,
        }
    }

    /// Record a new candle.
    pub fn put_trading_info(&mut self, candle: &Candle) {
        if self.first_candle.is_none() {
            self.first_candle = Some(candle.clone());
        }
        self.last_candle = Some(candle.clone());
        self.candles_processed += 1;
    }

    /// Record a request sent to the trader.
    pub fn put_request(&mut self, request: &OrderRequest) {
        self.requests.push(request.clone());
    }

    /// Record a trade result.
    pub fn put_result(&mut self, result: &TradeResult) {
        self.results.push(result.clone());
    }

    /// Record an account snapshot and update the drawdown.
    pub fn make_periodic_record(&mut self, account: &AccountInfo) {
        let total_value = account.total_value();

        if total_value > self.peak_value {
            self.peak_value = total_value;
        }
        if self.peak_value > Decimal::ZERO {
            let drawdown = (self.peak_value - total_value) / self.peak_value * dec!(100);
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }

        self.records.push(PeriodicRecord {
            date_time: self.last_candle.as_ref().map(|c| c.date_time_utc),
            account: account.clone(),
            total_value,
        });
    }

    /// All recorded requests.
    pub fn requests(&self) -> &[OrderRequest] {
        &self.requests
    }

    /// All recorded results.
    pub fn results(&self) -> &[TradeResult] {
        &self.results
    }

    /// Recorded account snapshots (equity curve).
    pub fn records(&self) -> &[PeriodicRecord] {
        &self.records
    }

    /// Score the run.
    ///
    /// Uses `account` when given, otherwise the latest periodic record, and
    /// falls back to the untouched starting budget.
    pub fn get_return_report(&self, account: Option<&AccountInfo>) -> ScoreReport {
        let account = account
            .cloned()
            .or_else(|| self.records.last().map(|r| r.account.clone()));

        let Some(mut account) = account else {
            return ScoreReport {
                price_change_pct: self.price_change_pct(),
                candles_processed: self.candles_processed,
                ..ScoreReport::empty(self.start_budget)
            };
        };

        if account.quote.is_zero() {
            if let Some(close) = self.last_close() {
                account.quote = close;
            }
        }

        let total_value = account.total_value();
        let cumulative_return_pct = if self.start_budget > Decimal::ZERO {
            ((total_value - self.start_budget) / self.start_budget * dec!(100)).round_dp(3)
        } else {
            Decimal::ZERO
        };

        let report = ScoreReport {
            start_budget: self.start_budget,
            balance: account.balance,
            asset_value: account.asset_value(),
            total_value,
            cumulative_return_pct,
            price_change_pct: self.price_change_pct(),
            max_drawdown_pct: self.max_drawdown_pct.round_dp(3),
            trade_count: self.results.iter().filter(|r| r.is_filled()).count(),
            candles_processed: self.candles_processed,
        };

        debug!(total = %report.total_value, ret = %report.cumulative_return_pct, "return report");
        report
    }

    fn last_close(&self) -> Option<Decimal> {
        self.last_candle
            .as_ref()
            .and_then(|c| Decimal::from_f64(c.close))
    }

    fn price_change_pct(&self) -> Decimal {
        let first = self
            .first_candle
            .as_ref()
            .and_then(|c| Decimal::from_f64(c.close));
        match (first, self.last_close()) {
            (Some(first), Some(last)) if first > Decimal::ZERO => {
                ((last - first) / first * dec!(100)).round_dp(3)
            }
            _ => Decimal::ZERO,
        }
    }
}

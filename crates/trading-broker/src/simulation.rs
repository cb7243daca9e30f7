//! Virtual-market trader for simulation and paper trading.

use async_trait::async_trait;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::{debug, info};
use trading_core::error::BrokerError;
use trading_core::traits::Trader;
use trading_core::types::{AccountInfo, Candle, OrderRequest, Side, TradeResult, TradeStatus};

/// Trader that fills requests against the latest observed candle.
///
/// A buy fills when its limit price is at or above the candle low and cash
/// covers the cost plus commission. A sell fills when its limit price is at
/// or below the candle high and the holding covers the amount. Fills happen
/// at the request price.
pub struct SimulationTrader {
    market: String,
    balance: Decimal,
    asset_amount: Decimal,
    asset_avg_price: Decimal,
    commission_ratio: Decimal,
    last_candle: Option<Candle>,
}

impl SimulationTrader {
    /// Create a new trader with a starting budget.
    pub fn new(market: &str, budget: Decimal) -> Self {
        Self {
            market: market.to_string(),
            balance: budget,
            asset_amount: Decimal::ZERO,
            asset_avg_price: Decimal::ZERO,
            commission_ratio: dec!(0.0005),
            last_candle: None,
        }
    }

    /// Set the commission ratio (0.0005 = 0.05%).
    pub fn with_commission(mut self, commission_ratio: Decimal) -> Self {
        self.commission_ratio = commission_ratio;
        self
    }

    fn quote(&self) -> Decimal {
        self.last_candle
            .as_ref()
            .and_then(|c| Decimal::from_f64(c.close))
            .unwrap_or(Decimal::ZERO)
    }

    fn result(
        request: &OrderRequest,
        fee: Decimal,
        status: TradeStatus,
        message: &str,
    ) -> TradeResult {
        let amount = if status == TradeStatus::Filled {
            request.amount
        } else {
            Decimal::ZERO
        };
        TradeResult {
            request_id: request.id,
            market: request.market.clone(),
            side: request.side,
            price: request.price,
            amount,
            fee,
            status,
            message: message.to_string(),
            date_time: request.date_time,
        }
    }

    fn execute_buy(&mut self, request: &OrderRequest, candle: &Candle) -> TradeResult {
        let low = Decimal::from_f64(candle.low).unwrap_or(Decimal::ZERO);
        if request.price < low {
            return Self::result(request, Decimal::ZERO, TradeStatus::Rejected, "price below market");
        }

        let value = request.notional();
        let fee = value * self.commission_ratio;
        if value + fee > self.balance {
            return Self::result(request, Decimal::ZERO, TradeStatus::Rejected, "insufficient balance");
        }

        let held_value = self.asset_avg_price * self.asset_amount;
        self.balance -= value + fee;
        self.asset_amount += request.amount;
        self.asset_avg_price = (held_value + value) / self.asset_amount;

        Self::result(request, fee, TradeStatus::Filled, "success")
    }

    fn execute_sell(&mut self, request: &OrderRequest, candle: &Candle) -> TradeResult {
        let high = Decimal::from_f64(candle.high).unwrap_or(Decimal::ZERO);
        if request.price > high {
            return Self::result(request, Decimal::ZERO, TradeStatus::Rejected, "price above market");
        }
        if request.amount > self.asset_amount {
            return Self::result(request, Decimal::ZERO, TradeStatus::Rejected, "insufficient asset");
        }

        let value = request.notional();
        let fee = value * self.commission_ratio;
        self.balance += value - fee;
        self.asset_amount -= request.amount;
        if self.asset_amount.is_zero() {
            self.asset_avg_price = Decimal::ZERO;
        }

        Self::result(request, fee, TradeStatus::Filled, "success")
    }
}

#[async_trait]
impl Trader for SimulationTrader {
    fn update_market(&mut self, candle: &Candle) {
        self.last_candle = Some(candle.clone());
    }

    async fn send_request(&mut self, request: &OrderRequest) -> Result<TradeResult, BrokerError> {
        if request.market != self.market {
            return Err(BrokerError::InvalidRequest(format!(
                "market {} is not traded here ({})",
                request.market, self.market
            )));
        }
        if request.amount <= Decimal::ZERO || request.price <= Decimal::ZERO {
            return Err(BrokerError::InvalidRequest(
                "price and amount must be positive".to_string(),
            ));
        }

        let candle = self.last_candle.clone().ok_or(BrokerError::NoMarketData)?;

        let result = match request.side {
            Side::Buy => self.execute_buy(request, &candle),
            Side::Sell => self.execute_sell(request, &candle),
        };

        if result.is_filled() {
            info!(
                side = %result.side,
                price = %result.price,
                amount = %result.amount,
                balance = %self.balance,
                "order filled"
            );
        } else {
            debug!(side = %result.side, reason = %result.message, "order rejected");
        }

        Ok(result)
    }

    async fn get_account_info(&self) -> Result<AccountInfo, BrokerError> {
        Ok(AccountInfo {
            balance: self.balance,
            asset_amount: self.asset_amount,
            asset_avg_price: self.asset_avg_price,
            quote: self.quote(),
        })
    }

    fn name(&self) -> &str {
        "Simulation Trader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(low: f64, high: f64, close: f64) -> Candle {
        let at = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        Candle {
            market: "KRW-BTC".to_string(),
            date_time_utc: at,
            date_time_local: at,
            open: close,
            high,
            low,
            close,
            acc_price: 0.0,
            acc_volume: 0.0,
        }
    }

    fn buy(price: Decimal, amount: Decimal) -> OrderRequest {
        let at = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        OrderRequest::buy("KRW-BTC", price, amount, at)
    }

    fn sell(price: Decimal, amount: Decimal) -> OrderRequest {
        let at = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        OrderRequest::sell("KRW-BTC", price, amount, at)
    }

    #[tokio::test]
    async fn test_buy_then_sell() {
        let mut trader = SimulationTrader::new("KRW-BTC", dec!(100000));
        trader.update_market(&candle(900.0, 1100.0, 1000.0));

        let filled = trader.send_request(&buy(dec!(1000), dec!(10))).await.unwrap();
        assert!(filled.is_filled());
        assert_eq!(filled.fee, dec!(5));

        let account = trader.get_account_info().await.unwrap();
        assert_eq!(account.balance, dec!(89995));
        assert_eq!(account.asset_amount, dec!(10));
        assert_eq!(account.asset_avg_price, dec!(1000));
        assert_eq!(account.total_value(), dec!(99995));

        trader.update_market(&candle(1150.0, 1250.0, 1200.0));
        let sold = trader.send_request(&sell(dec!(1200), dec!(10))).await.unwrap();
        assert!(sold.is_filled());

        let account = trader.get_account_info().await.unwrap();
        assert!(account.is_flat());
        assert_eq!(account.balance, dec!(89995) + dec!(12000) - dec!(6));
    }

    #[tokio::test]
    async fn test_rejects_unfillable_requests() {
        let mut trader = SimulationTrader::new("KRW-BTC", dec!(1000));
        trader.update_market(&candle(900.0, 1100.0, 1000.0));

        let low_bid = trader.send_request(&buy(dec!(800), dec!(1))).await.unwrap();
        assert_eq!(low_bid.status, TradeStatus::Rejected);

        let too_big = trader.send_request(&buy(dec!(1000), dec!(5))).await.unwrap();
        assert_eq!(too_big.status, TradeStatus::Rejected);
        assert_eq!(too_big.amount, Decimal::ZERO);

        let naked_sell = trader.send_request(&sell(dec!(1000), dec!(1))).await.unwrap();
        assert_eq!(naked_sell.status, TradeStatus::Rejected);

        let account = trader.get_account_info().await.unwrap();
        assert_eq!(account.balance, dec!(1000));
    }

    #[tokio::test]
    async fn test_requires_market_data() {
        let mut trader = SimulationTrader::new("KRW-BTC", dec!(1000));
        let result = trader.send_request(&buy(dec!(100), dec!(1))).await;
        assert_eq!(result, Err(BrokerError::NoMarketData));
    }

    #[tokio::test]
    async fn test_rejects_other_market() {
        let mut trader = SimulationTrader::new("KRW-ETH", dec!(1000));
        trader.update_market(&candle(900.0, 1100.0, 1000.0));
        let result = trader.send_request(&buy(dec!(1000), dec!(0.5))).await;
        assert!(matches!(result, Err(BrokerError::InvalidRequest(_))));
    }
}

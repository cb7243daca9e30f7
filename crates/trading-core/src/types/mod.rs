//! Core data types for the trading simulator.

mod account;
mod candle;
mod order;
mod score;

pub use account::AccountInfo;
pub use candle::Candle;
pub use order::{OrderRequest, Side, TradeResult, TradeStatus};
pub use score::ScoreReport;

#[cfg(test)]
pub(crate) use candle::tests::sample_candle;

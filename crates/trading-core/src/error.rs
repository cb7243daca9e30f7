//! Error types for the trading simulator.

use thiserror::Error;

/// Top-level trading error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market data errors.
///
/// Every transport or decoding failure of a data provider is normalized into
/// one of these variants so that callers only ever see a single error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Fail get data from server: {0}")]
    Fetch(String),

    #[error("Invalid data from server: {0}")]
    Parse(String),

    #[error("No more data available")]
    Exhausted,

    #[error("Data file error: {0}")]
    Io(String),
}

impl DataError {
    /// Whether the provider has simply run out of data.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, DataError::Exhausted)
    }
}

/// Trader errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerError {
    #[error("No market data received yet")]
    NoMarketData,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Trader error: {0}")]
    Internal(String),
}

/// Execution engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine is already running")]
    AlreadyRunning,

    #[error("Engine is missing a component: {0}")]
    MissingComponent(&'static str),

    #[error("Invalid interval: {0}")]
    InvalidInterval(f64),

    #[error("No async runtime available to drive the engine")]
    NoRuntime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_detection() {
        assert!(DataError::Exhausted.is_exhausted());
        assert!(!DataError::Fetch("timeout".into()).is_exhausted());
    }

    #[test]
    fn test_trading_error_from_data_error() {
        let err: TradingError = DataError::Parse("missing field".into()).into();
        assert!(err.to_string().contains("missing field"));
    }
}

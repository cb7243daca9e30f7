//! Core types and traits for the trading simulator.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle)
//! - Order requests, trade results and account snapshots
//! - Score reports produced by the analyzer
//! - Collaborator traits for data providers, strategies, traders and the execution engine

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BrokerError, DataError, EngineError, TradingError};
pub use traits::*;
pub use types::*;

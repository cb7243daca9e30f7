//! Core traits for the trading simulator.

mod data_provider;
mod engine;
mod strategy;
mod trader;

pub use data_provider::DataProvider;
pub use engine::{EngineState, ExecutionEngine, ScoreCallback};
pub use strategy::Strategy;
pub use trader::Trader;

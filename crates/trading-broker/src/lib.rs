//! Order execution.

mod simulation;

pub use simulation::SimulationTrader;

//! Run analysis and scoring.

mod analyzer;

pub use analyzer::{Analyzer, PeriodicRecord};

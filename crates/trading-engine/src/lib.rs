//! Periodic strategy execution engine.

mod operator;

pub use operator::{Operator, OperatorParts};

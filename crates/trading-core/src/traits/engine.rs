//! Execution engine contract.

use crate::error::EngineError;
use crate::types::{ScoreReport, TradeResult};
use serde::{Deserialize, Serialize};

/// Callback receiving a computed score.
///
/// It may run on the engine's own task, never assume the caller's thread.
pub type ScoreCallback = Box<dyn FnOnce(ScoreReport) + Send + 'static>;

/// Live state of an execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// Built and wired, never started
    Ready,
    /// Periodic loop active
    Running,
    /// Stopped on request, may be restarted
    Stopped,
    /// Data source exhausted, nothing more to do
    Finished,
}

impl EngineState {
    /// Check if the periodic loop is active.
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Ready => write!(f, "ready"),
            EngineState::Running => write!(f, "running"),
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Finished => write!(f, "finished"),
        }
    }
}

/// An engine that runs a strategy periodically on its own thread of control.
///
/// All methods are called from the controlling thread and must return
/// without waiting for an in-flight tick. After [`stop`](Self::stop)
/// returns, no further tick may begin.
pub trait ExecutionEngine: Send + Sync {
    /// Current live state.
    fn state(&self) -> EngineState;

    /// Start or resume the periodic loop.
    fn start(&self) -> Result<(), EngineError>;

    /// Stop the periodic loop. Safe to call in any state.
    fn stop(&self);

    /// Compute the score asynchronously and hand it to `callback` exactly once.
    fn get_score(&self, callback: ScoreCallback);

    /// All trade results so far, in execution order.
    fn get_trading_results(&self) -> Vec<TradeResult>;

    /// Most recent error raised inside the periodic loop.
    fn last_error(&self) -> Option<String> {
        None
    }
}

//! Session error types.

use thiserror::Error;
use trading_core::error::EngineError;

use crate::config::ConfigField;

/// A configuration value that failed parsing or validation.
///
/// The previous value of the field is always retained.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Rejected {field} value {value:?}: {reason}")]
pub struct ConfigRejected {
    pub field: ConfigField,
    pub value: String,
    pub reason: String,
}

impl ConfigRejected {
    pub(crate) fn new(field: ConfigField, value: &str, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Lifecycle operation requested in a state that does not allow it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("Not initialized")]
    NotInitialized,

    #[error("Already running")]
    AlreadyRunning,

    #[error("Session is terminated")]
    Terminated,

    #[error("Engine refused: {0}")]
    EngineRefused(#[from] EngineError),
}

/// Invalid command table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate command name or alias: {0}")]
    Duplicate(String),

    #[error("Command {0} needs a value but has no prompt")]
    MissingPrompt(String),

    #[error("Command name or alias must not be empty")]
    EmptyName,
}

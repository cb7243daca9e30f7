//! Interactive simulation session.
//!
//! A [`ControlLoop`] reads operator commands, resolves them through a
//! [`CommandRegistry`] and drives a [`LifecycleController`], which owns the
//! run configuration and the execution engine handle.

mod command;
mod config;
mod console;
mod control_loop;
mod controller;
mod error;
mod factory;
mod session;

pub use command::{CommandRegistry, CommandSpec, Dispatch, Handler};
pub use config::{parse_from_dash_to, ConfigField, RunConfig};
pub use console::Console;
pub use control_loop::{ControlLoop, ShutdownSignal};
pub use controller::{
    LevelControl, LifecycleController, LifecycleState, QueryOutcome, QueryTarget, ScoreHandle,
};
pub use error::{ConfigRejected, LifecycleError, RegistryError};
pub use factory::{EngineFactory, OperatorFactory};
pub use session::{session_commands, Session, MAIN_PROMPT};

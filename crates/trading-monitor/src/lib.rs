//! Logging and runtime verbosity control.

mod logging;

pub use logging::{setup_logging, severity_to_filter, LogHandle, LoggingError};

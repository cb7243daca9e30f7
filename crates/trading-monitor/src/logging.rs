//! Logging setup.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Layer, Registry};
use trading_config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "tradesim.log";

/// Logging setup errors.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),

    #[error("Failed to prepare log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to change log level: {0}")]
    Reload(#[from] reload::Error),
}

/// Map a numeric severity onto a filter directive.
///
/// 50 and 40 are error, 30 warn, 20 info, 10 debug, anything lower trace.
pub fn severity_to_filter(severity: i32) -> &'static str {
    match severity {
        s if s >= 40 => "error",
        s if s >= 30 => "warn",
        s if s >= 20 => "info",
        s if s >= 10 => "debug",
        _ => "trace",
    }
}

/// Handle to the installed subscriber.
///
/// Keeps the file writer alive; dropping it flushes pending file output.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    _file_guard: Option<WorkerGuard>,
}

impl LogHandle {
    /// Replace the active filter with one derived from a numeric severity.
    pub fn set_severity(&self, severity: i32) -> Result<(), LoggingError> {
        let directive = severity_to_filter(severity);
        self.filter
            .modify(|filter| *filter = EnvFilter::new(directive))?;
        tracing::info!(severity, level = directive, "log level changed");
        Ok(())
    }
}

/// Setup logging from configuration.
///
/// `RUST_LOG` takes precedence over the configured level at startup.
pub fn setup_logging(config: &LoggingConfig) -> Result<LogHandle, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let (filter, handle) = reload::Layer::new(filter);

    // stdout belongs to the command prompt.
    let console = if config.format == "json" {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().pretty().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, file_guard) = match &config.file {
        Some(dir) => {
            fs::create_dir_all(Path::new(dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(LogHandle {
        filter: handle,
        _file_guard: file_guard,
    })
}

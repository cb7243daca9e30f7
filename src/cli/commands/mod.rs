//! CLI command implementations.

pub mod interactive;
pub mod show_config;
pub mod single;
pub mod strategies;

use anyhow::Result;
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;
use tracing::debug;
use trading_config::AppConfig;
use trading_session::{RunConfig, ShutdownSignal};

/// Forward SIGINT and SIGTERM to the returned channel.
pub fn shutdown_signals() -> Result<mpsc::Receiver<ShutdownSignal>> {
    let (tx, rx) = mpsc::channel(4);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = sigint.recv() => ShutdownSignal::Interrupt,
                    _ = sigterm.recv() => ShutdownSignal::Terminate,
                };
                debug!(signal = %received, "signal caught");
                if tx.send(received).await.is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(ShutdownSignal::Interrupt).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(rx)
}

/// Initial run configuration from the loaded settings.
pub fn run_config(config: &AppConfig) -> Result<RunConfig> {
    Ok(RunConfig::from_settings(&config.simulation)?)
}

/// Operator input as an async line source.
///
/// Read on a plain thread: a pending `tokio::io::stdin` read holds up runtime
/// shutdown until the next line arrives.
pub fn stdin_lines() -> BufReader<DuplexStream> {
    let (mut writer, reader) = tokio::io::duplex(4096);
    let handle = tokio::runtime::Handle::current();

    std::thread::spawn(move || {
        use std::io::BufRead;

        // Raw bytes; decoding happens in the control loop.
        for line in std::io::stdin().lock().split(b'\n') {
            let Ok(mut data) = line else {
                break;
            };
            data.push(b'\n');
            if handle.block_on(writer.write_all(&data)).is_err() {
                break;
            }
        }
    });

    BufReader::new(reader)
}

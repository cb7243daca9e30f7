//! Interactive simulator command.

use anyhow::Result;
use tracing::info;
use trading_config::AppConfig;
use trading_monitor::LogHandle;
use trading_session::{Console, ControlLoop, LifecycleController, OperatorFactory, Session};

use super::{run_config, shutdown_signals, stdin_lines};

pub async fn run(config: &AppConfig, log_handle: LogHandle) -> Result<()> {
    let run_config = run_config(config)?;
    info!(
        end = %run_config.period_end_text(),
        count = run_config.sample_count,
        interval = run_config.interval,
        "starting interactive session"
    );

    let controller = LifecycleController::new(run_config, Box::new(OperatorFactory::new()))
        .with_log_control(Box::new(log_handle));
    let mut control_loop = ControlLoop::new(Session::new(controller, Console::stdout()))?;

    let shutdown = shutdown_signals()?;
    control_loop.run(stdin_lines(), shutdown).await;

    control_loop.session_mut().controller_mut().terminate();
    Ok(())
}

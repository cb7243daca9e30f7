//! Single run command: initialize, run to completion, print the score.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};
use trading_config::AppConfig;
use trading_monitor::LogHandle;
use trading_session::{
    LifecycleController, LifecycleState, OperatorFactory, QueryOutcome, QueryTarget,
};

use super::{run_config, shutdown_signals};

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const SCORE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(config: &AppConfig, log_handle: LogHandle) -> Result<()> {
    let mut controller =
        LifecycleController::new(run_config(config)?, Box::new(OperatorFactory::new()))
            .with_log_control(Box::new(log_handle));
    let mut shutdown = shutdown_signals()?;

    controller.initialize()?;
    println!("{}", controller.config());
    controller.start()?;

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = poll.tick() => {
                if controller.state() != LifecycleState::Running {
                    break;
                }
            }
            Some(signal) = shutdown.recv() => {
                info!(%signal, "interrupted, stopping run");
                controller.stop();
                break;
            }
        }
    }

    if let QueryOutcome::Score(handle) = controller.query(QueryTarget::Score)? {
        match handle.wait_timeout(SCORE_TIMEOUT).await {
            Some(report) => {
                println!("final score ==========");
                println!("{report}");
            }
            None => warn!("score not available"),
        }
    }

    controller.terminate();
    Ok(())
}

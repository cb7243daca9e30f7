//! The operator: runs a strategy on a fixed wall-clock interval.
//!
//! Each tick pulls one candle from the data provider, feeds it to the
//! strategy, sends the resulting requests to the trader and records
//! everything in the analyzer. The loop lives on its own tokio task; the
//! controlling thread only ever flips state under a short lock.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, warn};
use trading_analyzer::Analyzer;
use trading_core::error::{EngineError, TradingError};
use trading_core::traits::{DataProvider, EngineState, ExecutionEngine, ScoreCallback, Strategy, Trader};
use trading_core::types::TradeResult;

/// Components wired into an operator.
pub struct OperatorParts {
    pub data_provider: Box<dyn DataProvider>,
    pub strategy: Box<dyn Strategy>,
    pub trader: Box<dyn Trader>,
    pub analyzer: Analyzer,
}

struct Pipeline {
    data_provider: Box<dyn DataProvider>,
    strategy: Box<dyn Strategy>,
    trader: Box<dyn Trader>,
    analyzer: Analyzer,
}

struct Control {
    state: EngineState,
    /// Bumped on every start; a loop only ticks while its generation is current.
    generation: u64,
    stop_signal: Option<Arc<Notify>>,
    last_error: Option<String>,
}

struct Shared {
    control: Mutex<Control>,
    pipeline: tokio::sync::Mutex<Pipeline>,
    results: Mutex<Vec<TradeResult>>,
    ticks: AtomicU64,
    interval: Duration,
}

impl Shared {
    /// Claim the next tick for `generation`. Returns false once stopped.
    fn begin_tick(&self, generation: u64) -> bool {
        let control = self.control.lock().unwrap();
        if control.state != EngineState::Running || control.generation != generation {
            return false;
        }
        self.ticks.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn finish(&self, generation: u64) {
        let mut control = self.control.lock().unwrap();
        if control.generation == generation && control.state == EngineState::Running {
            control.state = EngineState::Finished;
            control.stop_signal = None;
        }
    }

    fn record_error(&self, error: &TradingError) {
        self.control.lock().unwrap().last_error = Some(error.to_string());
    }

    async fn execute_tick(&self) -> Result<(), TradingError> {
        let mut pipeline = self.pipeline.lock().await;
        let Pipeline {
            data_provider,
            strategy,
            trader,
            analyzer,
        } = &mut *pipeline;

        let candle = data_provider.get_info().await?;
        debug!(market = %candle.market, close = candle.close, at = %candle.date_time_utc, "tick");

        strategy.update_trading_info(&candle);
        analyzer.put_trading_info(&candle);
        trader.update_market(&candle);

        for request in strategy.get_request() {
            analyzer.put_request(&request);
            let result = trader.send_request(&request).await?;
            strategy.update_result(&result);
            analyzer.put_result(&result);
            self.results.lock().unwrap().push(result);
        }

        let account = trader.get_account_info().await?;
        analyzer.make_periodic_record(&account);

        Ok(())
    }
}

async fn run_loop(shared: Arc<Shared>, generation: u64, stop_signal: Arc<Notify>) {
    loop {
        if !shared.begin_tick(generation) {
            break;
        }

        let started = Instant::now();
        match shared.execute_tick().await {
            Ok(()) => {}
            Err(TradingError::Data(e)) if e.is_exhausted() => {
                info!("no more data, operator finished");
                shared.finish(generation);
                break;
            }
            Err(e) => {
                warn!(error = %e, "tick failed");
                shared.record_error(&e);
            }
        }

        let wait = shared.interval.saturating_sub(started.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = stop_signal.notified() => break,
        }
    }
    debug!(generation, "operator loop exited");
}

/// Execution engine driving the periodic trading loop.
pub struct Operator {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl Operator {
    /// Wire the components and prepare the strategy with `budget`.
    ///
    /// Must be called from within a tokio runtime; the loop is spawned onto it.
    pub fn new(parts: OperatorParts, budget: Decimal, interval_secs: f64) -> Result<Self, EngineError> {
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(EngineError::InvalidInterval(interval_secs));
        }
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let OperatorParts {
            data_provider,
            mut strategy,
            trader,
            analyzer,
        } = parts;
        strategy.initialize(budget);

        info!(
            data = data_provider.name(),
            strategy = strategy.name(),
            trader = trader.name(),
            budget = %budget,
            interval_secs,
            "operator initialized"
        );

        let shared = Shared {
            control: Mutex::new(Control {
                state: EngineState::Ready,
                generation: 0,
                stop_signal: None,
                last_error: None,
            }),
            pipeline: tokio::sync::Mutex::new(Pipeline {
                data_provider,
                strategy,
                trader,
                analyzer,
            }),
            results: Mutex::new(Vec::new()),
            ticks: AtomicU64::new(0),
            interval: Duration::from_secs_f64(interval_secs),
        };

        Ok(Self {
            shared: Arc::new(shared),
            runtime,
        })
    }

    /// Number of ticks begun so far.
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.load(Ordering::SeqCst)
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }
}

impl ExecutionEngine for Operator {
    fn state(&self) -> EngineState {
        self.shared.control.lock().unwrap().state
    }

    fn start(&self) -> Result<(), EngineError> {
        let (generation, stop_signal) = {
            let mut control = self.shared.control.lock().unwrap();
            if control.state == EngineState::Running {
                return Err(EngineError::AlreadyRunning);
            }
            control.generation += 1;
            control.state = EngineState::Running;
            let stop_signal = Arc::new(Notify::new());
            control.stop_signal = Some(stop_signal.clone());
            (control.generation, stop_signal)
        };

        info!(generation, "operator started");
        self.runtime
            .spawn(run_loop(self.shared.clone(), generation, stop_signal));
        Ok(())
    }

    fn stop(&self) {
        let mut control = self.shared.control.lock().unwrap();
        if control.state == EngineState::Running {
            control.state = EngineState::Stopped;
            info!(generation = control.generation, "operator stopped");
        }
        if let Some(stop_signal) = control.stop_signal.take() {
            stop_signal.notify_one();
        }
    }

    fn get_score(&self, callback: ScoreCallback) {
        let shared = self.shared.clone();
        self.runtime.spawn(async move {
            let report = {
                let pipeline = shared.pipeline.lock().await;
                let account = match pipeline.trader.get_account_info().await {
                    Ok(account) => Some(account),
                    Err(e) => {
                        warn!(error = %e, "account info unavailable, scoring last record");
                        None
                    }
                };
                pipeline.analyzer.get_return_report(account.as_ref())
            };
            callback(report);
        });
    }

    fn get_trading_results(&self) -> Vec<TradeResult> {
        self.shared.results.lock().unwrap().clone()
    }

    fn last_error(&self) -> Option<String> {
        self.shared.control.lock().unwrap().last_error.clone()
    }
}

impl Drop for Operator {
    fn drop(&mut self) {
        self.stop();
    }
}

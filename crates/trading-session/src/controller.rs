//! Lifecycle controller.
//!
//! Owns the run configuration and the execution engine handle, and enforces
//! the `Uninitialized -> Initialized -> Running <-> Stopped -> Terminated`
//! progression.

use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use trading_core::traits::{EngineState, ExecutionEngine};
use trading_core::types::{ScoreReport, TradeResult};
use trading_monitor::LogHandle;

use crate::config::{ConfigField, RunConfig};
use crate::error::{ConfigRejected, LifecycleError};
use crate::factory::EngineFactory;

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
    /// Absorbing
    Terminated,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Initialized => write!(f, "initialized"),
            LifecycleState::Running => write!(f, "running"),
            LifecycleState::Stopped => write!(f, "stopped"),
            LifecycleState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Receiver of the `log` command's severity.
pub trait LevelControl: Send {
    fn set_severity(&self, severity: i32);
}

impl LevelControl for LogHandle {
    fn set_severity(&self, severity: i32) {
        if let Err(e) = LogHandle::set_severity(self, severity) {
            warn!(severity, error = %e, "log level not changed");
        }
    }
}

/// What a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    State,
    Score,
    Result,
}

impl QueryTarget {
    /// Parse `state|1`, `score|2` or `result|3`, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "state" | "1" => Some(QueryTarget::State),
            "score" | "2" => Some(QueryTarget::Score),
            "result" | "3" => Some(QueryTarget::Result),
            _ => None,
        }
    }
}

/// Pending score computation.
///
/// Completes once with the report, or never if the engine is dropped first.
pub struct ScoreHandle {
    receiver: oneshot::Receiver<ScoreReport>,
}

impl ScoreHandle {
    /// Wait for the report. `None` if the engine went away.
    pub async fn wait(self) -> Option<ScoreReport> {
        self.receiver.await.ok()
    }

    /// Wait at most `timeout` for the report.
    pub async fn wait_timeout(self, timeout: Duration) -> Option<ScoreReport> {
        tokio::time::timeout(timeout, self.receiver).await.ok()?.ok()
    }

    /// Take the report if it has arrived.
    pub fn try_take(&mut self) -> Option<ScoreReport> {
        self.receiver.try_recv().ok()
    }
}

/// Answer to a query.
pub enum QueryOutcome {
    State {
        engine: EngineState,
        last_error: Option<String>,
    },
    Score(ScoreHandle),
    Results(Vec<TradeResult>),
}

/// Holds the run configuration and drives the engine through its lifecycle.
pub struct LifecycleController {
    config: RunConfig,
    state: LifecycleState,
    engine: Option<Box<dyn ExecutionEngine>>,
    factory: Box<dyn EngineFactory>,
    log_control: Option<Box<dyn LevelControl>>,
}

impl LifecycleController {
    pub fn new(config: RunConfig, factory: Box<dyn EngineFactory>) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            engine: None,
            factory,
            log_control: None,
        }
    }

    /// Forward `log` severities to `control`.
    pub fn with_log_control(mut self, control: Box<dyn LevelControl>) -> Self {
        self.log_control = Some(control);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Current lifecycle state, reconciled with the engine.
    ///
    /// An engine that finished on its own leaves `Running` as `Stopped`.
    pub fn state(&mut self) -> LifecycleState {
        self.sync_with_engine();
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == LifecycleState::Terminated
    }

    fn sync_with_engine(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }
        if let Some(engine) = &self.engine {
            let engine_state = engine.state();
            if !engine_state.is_running() {
                debug!(%engine_state, "engine left running on its own");
                self.state = LifecycleState::Stopped;
            }
        }
    }

    /// Assign one configuration field.
    ///
    /// A rejected value leaves the field unchanged. Changes take effect on
    /// the next [`initialize`](Self::initialize).
    pub fn configure(&mut self, field: ConfigField, raw: &str) -> Result<(), ConfigRejected> {
        if self.is_terminated() {
            return Err(ConfigRejected::new(field, raw, "session is terminated"));
        }
        self.config.apply(field, raw)?;

        if field == ConfigField::LogLevel {
            if let Some(control) = &self.log_control {
                control.set_severity(self.config.log_level);
            }
        }
        debug!(%field, value = raw.trim(), "config updated");
        Ok(())
    }

    /// Build a fresh engine from the current configuration.
    ///
    /// Allowed before the first start and while stopped; a previous engine is
    /// stopped and replaced.
    pub fn initialize(&mut self) -> Result<(), LifecycleError> {
        match self.state() {
            LifecycleState::Terminated => return Err(LifecycleError::Terminated),
            LifecycleState::Running => return Err(LifecycleError::AlreadyRunning),
            _ => {}
        }

        let engine = self.factory.build(&self.config)?;
        if let Some(previous) = self.engine.replace(engine) {
            previous.stop();
        }
        self.state = LifecycleState::Initialized;

        info!(
            end = %self.config.period_end_text(),
            count = self.config.sample_count,
            interval = self.config.interval,
            budget = self.config.budget,
            strategy = %self.config.strategy,
            "simulation initialized"
        );
        Ok(())
    }

    /// Start or resume the engine.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        match self.state() {
            LifecycleState::Terminated => return Err(LifecycleError::Terminated),
            LifecycleState::Uninitialized => return Err(LifecycleError::NotInitialized),
            LifecycleState::Running => return Err(LifecycleError::AlreadyRunning),
            LifecycleState::Initialized | LifecycleState::Stopped => {}
        }

        let engine = self.engine.as_ref().ok_or(LifecycleError::NotInitialized)?;
        engine.start()?;
        self.state = LifecycleState::Running;

        info!(
            end = %self.config.period_end_text(),
            count = self.config.sample_count,
            "simulation started"
        );
        Ok(())
    }

    /// Stop the engine. Safe in any state.
    pub fn stop(&mut self) {
        if let Some(engine) = &self.engine {
            engine.stop();
        }
        if self.state == LifecycleState::Running {
            self.state = LifecycleState::Stopped;
            info!("simulation stopped");
        }
    }

    /// Stop and end the session for good.
    pub fn terminate(&mut self) {
        self.stop();
        if self.state != LifecycleState::Terminated {
            self.state = LifecycleState::Terminated;
            info!("session terminated");
        }
    }

    /// Ask the engine for its state, score or results.
    ///
    /// A score query returns at once; the report arrives through the handle.
    pub fn query(&mut self, target: QueryTarget) -> Result<QueryOutcome, LifecycleError> {
        if self.is_terminated() {
            return Err(LifecycleError::Terminated);
        }
        let engine = self.engine.as_ref().ok_or(LifecycleError::NotInitialized)?;

        let outcome = match target {
            QueryTarget::State => QueryOutcome::State {
                engine: engine.state(),
                last_error: engine.last_error(),
            },
            QueryTarget::Score => {
                let (tx, rx) = oneshot::channel();
                engine.get_score(Box::new(move |report| {
                    let _ = tx.send(report);
                }));
                QueryOutcome::Score(ScoreHandle { receiver: rx })
            }
            QueryTarget::Result => QueryOutcome::Results(engine.get_trading_results()),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use trading_core::error::EngineError;
    use trading_core::traits::ScoreCallback;
    use trading_strategies::StrategyKind;

    /// Engine double with an observable tick counter.
    ///
    /// Every `state()` call while running counts as one tick, which lets tests
    /// check that nothing ticks after `stop`.
    pub(crate) struct FakeEngine {
        pub(crate) state: Mutex<EngineState>,
        pub(crate) ticks: AtomicU64,
        pub(crate) refuse_start: bool,
        pub(crate) pending_scores: Mutex<Vec<ScoreCallback>>,
    }

    impl FakeEngine {
        pub(crate) fn new(refuse_start: bool) -> Self {
            Self {
                state: Mutex::new(EngineState::Ready),
                ticks: AtomicU64::new(0),
                refuse_start,
                pending_scores: Mutex::new(Vec::new()),
            }
        }

        /// Advance the engine by one tick if it is running.
        pub(crate) fn tick(&self) {
            if self.state.lock().unwrap().is_running() {
                self.ticks.fetch_add(1, Ordering::SeqCst);
            }
        }

        /// Deliver every pending score.
        pub(crate) fn fire_scores(&self) {
            let callbacks: Vec<ScoreCallback> =
                self.pending_scores.lock().unwrap().drain(..).collect();
            for callback in callbacks {
                callback(ScoreReport::empty(dec!(70000)));
            }
        }
    }

    impl ExecutionEngine for FakeEngine {
        fn state(&self) -> EngineState {
            *self.state.lock().unwrap()
        }

        fn start(&self) -> Result<(), EngineError> {
            if self.refuse_start {
                return Err(EngineError::AlreadyRunning);
            }
            *self.state.lock().unwrap() = EngineState::Running;
            Ok(())
        }

        fn stop(&self) {
            let mut state = self.state.lock().unwrap();
            if state.is_running() {
                *state = EngineState::Stopped;
            }
        }

        fn get_score(&self, callback: ScoreCallback) {
            self.pending_scores.lock().unwrap().push(callback);
        }

        fn get_trading_results(&self) -> Vec<TradeResult> {
            Vec::new()
        }
    }

    /// Boxable handle sharing a [`FakeEngine`] with the test.
    pub(crate) struct FakeHandle(pub(crate) Arc<FakeEngine>);

    impl ExecutionEngine for FakeHandle {
        fn state(&self) -> EngineState {
            self.0.state()
        }

        fn start(&self) -> Result<(), EngineError> {
            self.0.start()
        }

        fn stop(&self) {
            self.0.stop()
        }

        fn get_score(&self, callback: ScoreCallback) {
            self.0.get_score(callback)
        }

        fn get_trading_results(&self) -> Vec<TradeResult> {
            self.0.get_trading_results()
        }
    }

    /// Factory handing out shared fake engines and recording the configs.
    #[derive(Clone, Default)]
    pub(crate) struct FakeFactory {
        pub(crate) built: Arc<Mutex<Vec<RunConfig>>>,
        pub(crate) engines: Arc<Mutex<Vec<Arc<FakeEngine>>>>,
        pub(crate) refuse_start: bool,
    }

    impl FakeFactory {
        pub(crate) fn last_engine(&self) -> Arc<FakeEngine> {
            self.engines.lock().unwrap().last().unwrap().clone()
        }
    }

    impl EngineFactory for FakeFactory {
        fn build(&self, config: &RunConfig) -> Result<Box<dyn ExecutionEngine>, EngineError> {
            let engine = Arc::new(FakeEngine::new(self.refuse_start));
            self.built.lock().unwrap().push(config.clone());
            self.engines.lock().unwrap().push(engine.clone());
            Ok(Box::new(FakeHandle(engine)))
        }
    }

    #[derive(Default)]
    struct RecordingLevel {
        levels: Arc<Mutex<Vec<i32>>>,
    }

    impl LevelControl for RecordingLevel {
        fn set_severity(&self, severity: i32) {
            self.levels.lock().unwrap().push(severity);
        }
    }

    fn controller() -> (LifecycleController, FakeFactory) {
        let factory = FakeFactory::default();
        let controller = LifecycleController::new(RunConfig::default(), Box::new(factory.clone()));
        (controller, factory)
    }

    #[test]
    fn test_start_requires_initialize() {
        let (mut controller, _factory) = controller();

        assert_eq!(controller.start(), Err(LifecycleError::NotInitialized));
        assert_eq!(controller.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut controller, factory) = controller();

        controller.initialize().unwrap();
        assert_eq!(controller.state(), LifecycleState::Initialized);

        controller.start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Running);
        assert_eq!(controller.start(), Err(LifecycleError::AlreadyRunning));
        assert_eq!(controller.initialize(), Err(LifecycleError::AlreadyRunning));

        controller.stop();
        assert_eq!(controller.state(), LifecycleState::Stopped);
        assert_eq!(factory.last_engine().state(), EngineState::Stopped);

        controller.start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Running);

        controller.terminate();
        assert_eq!(controller.state(), LifecycleState::Terminated);
        assert_eq!(factory.last_engine().state(), EngineState::Stopped);
        assert_eq!(controller.start(), Err(LifecycleError::Terminated));
        assert_eq!(controller.initialize(), Err(LifecycleError::Terminated));
        assert!(matches!(
            controller.query(QueryTarget::State),
            Err(LifecycleError::Terminated)
        ));
    }

    #[test]
    fn test_stop_before_initialize_is_noop() {
        let (mut controller, _factory) = controller();
        controller.stop();
        assert_eq!(controller.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_engine_refusal_keeps_state() {
        let factory = FakeFactory {
            refuse_start: true,
            ..Default::default()
        };
        let mut controller =
            LifecycleController::new(RunConfig::default(), Box::new(factory.clone()));

        controller.initialize().unwrap();
        assert!(matches!(
            controller.start(),
            Err(LifecycleError::EngineRefused(_))
        ));
        assert_eq!(controller.state(), LifecycleState::Initialized);
    }

    #[test]
    fn test_no_tick_after_stop() {
        let (mut controller, factory) = controller();
        controller.initialize().unwrap();

        controller.start().unwrap();
        let engine = factory.last_engine();
        engine.tick();
        controller.stop();
        let ticks = engine.ticks.load(Ordering::SeqCst);

        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.ticks.load(Ordering::SeqCst), ticks);
    }

    #[test]
    fn test_configure_then_initialize_snapshots_config() {
        let (mut controller, factory) = controller();

        controller.configure(ConfigField::SampleCount, "50").unwrap();
        controller.configure(ConfigField::Interval, "1").unwrap();
        controller.configure(ConfigField::Budget, "70000").unwrap();
        controller.configure(ConfigField::Strategy, "1").unwrap();
        controller.initialize().unwrap();
        controller.start().unwrap();

        let built = factory.built.lock().unwrap().last().cloned().unwrap();
        assert_eq!(built.sample_count, 50);
        assert_eq!(built.interval, 1.0);
        assert_eq!(built.budget, 70000);
        assert_eq!(built.strategy, StrategyKind::SmaCrossover);

        match controller.query(QueryTarget::State).unwrap() {
            QueryOutcome::State { engine, .. } => assert_eq!(engine, EngineState::Running),
            _ => panic!("expected a state answer"),
        }

        // Later changes do not reach the running engine.
        controller.configure(ConfigField::SampleCount, "10").unwrap();
        assert_eq!(factory.built.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_value_keeps_previous() {
        let (mut controller, _factory) = controller();

        assert!(controller.configure(ConfigField::SampleCount, "-5").is_err());
        assert_eq!(controller.config().sample_count, 100);
    }

    #[test]
    fn test_reinitialize_replaces_engine() {
        let (mut controller, factory) = controller();
        controller.initialize().unwrap();
        controller.start().unwrap();
        controller.stop();

        controller.configure(ConfigField::Budget, "90000").unwrap();
        controller.initialize().unwrap();

        assert_eq!(factory.engines.lock().unwrap().len(), 2);
        assert_eq!(factory.last_engine().state(), EngineState::Ready);
        assert_eq!(controller.state(), LifecycleState::Initialized);
        assert_eq!(factory.built.lock().unwrap()[1].budget, 90000);
    }

    #[test]
    fn test_finished_engine_reads_as_stopped() {
        let (mut controller, factory) = controller();
        controller.initialize().unwrap();
        controller.start().unwrap();

        *factory.last_engine().state.lock().unwrap() = EngineState::Finished;
        assert_eq!(controller.state(), LifecycleState::Stopped);
    }

    #[test]
    fn test_log_level_forwarded() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let (controller, _factory) = controller();
        let mut controller = controller.with_log_control(Box::new(RecordingLevel {
            levels: levels.clone(),
        }));

        controller.configure(ConfigField::LogLevel, "10").unwrap();
        assert!(controller.configure(ConfigField::LogLevel, "debug").is_err());

        assert_eq!(*levels.lock().unwrap(), vec![10]);
        assert_eq!(controller.config().log_level, 10);
    }

    #[test]
    fn test_query_target_parse() {
        assert_eq!(QueryTarget::parse("STATE"), Some(QueryTarget::State));
        assert_eq!(QueryTarget::parse("1"), Some(QueryTarget::State));
        assert_eq!(QueryTarget::parse("score"), Some(QueryTarget::Score));
        assert_eq!(QueryTarget::parse("2"), Some(QueryTarget::Score));
        assert_eq!(QueryTarget::parse(" result "), Some(QueryTarget::Result));
        assert_eq!(QueryTarget::parse("3"), Some(QueryTarget::Result));
        assert_eq!(QueryTarget::parse("4"), None);
    }

    #[tokio::test]
    async fn test_score_query_returns_before_report() {
        let (mut controller, factory) = controller();
        controller.initialize().unwrap();

        let Ok(QueryOutcome::Score(mut handle)) = controller.query(QueryTarget::Score) else {
            panic!("expected a score handle");
        };
        assert!(handle.try_take().is_none());

        factory.last_engine().fire_scores();
        let report = handle.wait_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(report.start_budget, dec!(70000));
    }

    #[test]
    fn test_query_requires_engine() {
        let (mut controller, _factory) = controller();
        assert!(matches!(
            controller.query(QueryTarget::Result),
            Err(LifecycleError::NotInitialized)
        ));
    }
}

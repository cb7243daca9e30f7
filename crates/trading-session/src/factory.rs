//! Building execution engines from a run configuration.

use tracing::{info, warn};
use trading_analyzer::Analyzer;
use trading_broker::SimulationTrader;
use trading_config::RunMode;
use trading_core::error::EngineError;
use trading_core::traits::{DataProvider, ExecutionEngine};
use trading_data::{HistorySource, SimulationDataProvider, UpbitDataProvider};
use trading_engine::{Operator, OperatorParts};
use trading_strategies::StrategyRegistry;

use crate::config::RunConfig;

/// Creates an execution engine wired for a given configuration.
pub trait EngineFactory: Send {
    fn build(&self, config: &RunConfig) -> Result<Box<dyn ExecutionEngine>, EngineError>;
}

/// Builds [`Operator`]s backed by the simulation trader.
pub struct OperatorFactory {
    strategies: StrategyRegistry,
}

impl OperatorFactory {
    pub fn new() -> Self {
        Self {
            strategies: StrategyRegistry::new(),
        }
    }

    fn data_provider(config: &RunConfig) -> Box<dyn DataProvider> {
        match config.mode {
            RunMode::Simulation => {
                let source = match &config.data_file {
                    Some(path) => HistorySource::Csv(path.clone()),
                    None => HistorySource::Upbit(UpbitDataProvider::new(&config.market)),
                };
                Box::new(SimulationDataProvider::new(
                    source,
                    &config.market,
                    config.period_end,
                    config.sample_count,
                ))
            }
            RunMode::Live => Box::new(UpbitDataProvider::new(&config.market)),
        }
    }
}

impl Default for OperatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for OperatorFactory {
    fn build(&self, config: &RunConfig) -> Result<Box<dyn ExecutionEngine>, EngineError> {
        let strategy = self
            .strategies
            .create_default(config.strategy)
            .map_err(|e| {
                warn!(strategy = %config.strategy, error = %e, "strategy unavailable");
                EngineError::MissingComponent("strategy")
            })?;

        let budget = config.budget_decimal();
        let trader = SimulationTrader::new(&config.market, budget)
            .with_commission(config.commission_ratio);

        let parts = OperatorParts {
            data_provider: Self::data_provider(config),
            strategy,
            trader: Box::new(trader),
            analyzer: Analyzer::new(budget),
        };

        let operator = Operator::new(parts, budget, config.interval)?;
        info!(
            mode = %config.mode,
            market = %config.market,
            strategy = %config.strategy,
            "engine built"
        );
        Ok(Box::new(operator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use trading_core::traits::EngineState;

    #[tokio::test]
    async fn test_builds_ready_operator() {
        let config = RunConfig {
            data_file: Some(PathBuf::from("does-not-matter.csv")),
            ..RunConfig::default()
        };
        let engine = OperatorFactory::new().build(&config).unwrap();

        assert_eq!(engine.state(), EngineState::Ready);
        assert!(engine.get_trading_results().is_empty());
    }

    #[test]
    fn test_requires_runtime() {
        let result = OperatorFactory::new().build(&RunConfig::default());
        assert!(matches!(result, Err(EngineError::NoRuntime)));
    }
}

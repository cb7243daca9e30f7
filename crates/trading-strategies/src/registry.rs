//! Strategy registry for selecting strategies by number.

use serde::{Deserialize, Serialize};
use trading_core::traits::Strategy;

use crate::{
    BuyAndHoldConfig, BuyAndHoldStrategy, SmaCrossoverConfig, SmaCrossoverStrategy, StrategyError,
};

/// Strategies selectable from the simulator, keyed by their number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Strategy 0
    #[default]
    BuyAndHold,
    /// Strategy 1
    SmaCrossover,
}

impl StrategyKind {
    /// All kinds, in number order.
    pub const ALL: [StrategyKind; 2] = [StrategyKind::BuyAndHold, StrategyKind::SmaCrossover];

    /// Parse the exact strategy number (`"0"` or `"1"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(StrategyKind::BuyAndHold),
            "1" => Some(StrategyKind::SmaCrossover),
            _ => None,
        }
    }

    /// Map a configured number onto a kind.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(StrategyKind::BuyAndHold),
            1 => Some(StrategyKind::SmaCrossover),
            _ => None,
        }
    }

    /// The strategy number.
    pub fn code(&self) -> u8 {
        match self {
            StrategyKind::BuyAndHold => 0,
            StrategyKind::SmaCrossover => 1,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::BuyAndHold => write!(f, "buy-and-hold"),
            StrategyKind::SmaCrossover => write!(f, "sma-crossover"),
        }
    }
}

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy kind
    pub kind: StrategyKind,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available trading strategies.
pub struct StrategyRegistry {
    strategies: Vec<StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let strategies = vec![
            StrategyInfo {
                kind: StrategyKind::BuyAndHold,
                name: "Buy and Hold".to_string(),
                description: "Buys in equal installments at the latest price and holds"
                    .to_string(),
                default_config: serde_json::to_value(BuyAndHoldConfig::default())
                    .unwrap_or_default(),
            },
            StrategyInfo {
                kind: StrategyKind::SmaCrossover,
                name: "SMA Crossover".to_string(),
                description: "Trades short/long simple moving average crossovers".to_string(),
                default_config: serde_json::to_value(SmaCrossoverConfig::default())
                    .unwrap_or_default(),
            },
        ];

        Self { strategies }
    }

    /// List all available strategies, in number order.
    pub fn list(&self) -> &[StrategyInfo] {
        &self.strategies
    }

    /// Get strategy info by kind.
    pub fn get(&self, kind: StrategyKind) -> Option<&StrategyInfo> {
        self.strategies.iter().find(|info| info.kind == kind)
    }

    /// Create a strategy instance from a JSON configuration.
    pub fn create(
        &self,
        kind: StrategyKind,
        config: serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        match kind {
            StrategyKind::BuyAndHold => {
                let config: BuyAndHoldConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                Ok(Box::new(BuyAndHoldStrategy::new(config)))
            }
            StrategyKind::SmaCrossover => {
                let config: SmaCrossoverConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                Ok(Box::new(SmaCrossoverStrategy::new(config)))
            }
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(kind)
            .ok_or_else(|| StrategyError::NotFound(kind.to_string()))?;
        self.create(kind, info.default_config.clone())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Strategy registry for dynamic strategy loading.

use crate::{
    AdxSmaConfig, AdxSmaStrategy, HullSuiteConfig, HullSuiteStrategy, RhCombinedConfig,
    RhCombinedStrategy, Strategy, VwapBollingerConfig, VwapBollingerStrategy,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use signals_core::StrategyError;
use std::collections::BTreeMap;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub key: String,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for the built-in strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

fn parse_config<T: DeserializeOwned>(
    config: serde_json::Value,
) -> Result<T, StrategyError> {
    // `null` means defaults
    let config = if config.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        config
    };
    serde_json::from_value(config).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

fn to_json<T: Serialize>(config: &T) -> serde_json::Value {
    serde_json::to_value(config).unwrap_or(serde_json::Value::Null)
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let entries = [
            (
                "hull_suite",
                "Hull Suite",
                "Follows the slope of a Hull moving average with optional MACD confirmation",
                to_json(&HullSuiteConfig::default()),
            ),
            (
                "vwap_bollinger",
                "VWAP Bollinger",
                "Buys lower Bollinger band touches during a VWAP uptrend with a ratcheting ATR stoploss",
                to_json(&VwapBollingerConfig::default()),
            ),
            (
                "adx_sma",
                "ADX SMA Crossover",
                "Trades fast/slow SMA crossovers filtered by ADX trend strength",
                to_json(&AdxSmaConfig::default()),
            ),
            (
                "rh_combined",
                "RH Combined",
                "BinHV45 or ClucMay dip entries filtered by the BTC SMA trend",
                to_json(&RhCombinedConfig::default()),
            ),
        ];

        let strategies = entries
            .into_iter()
            .map(|(key, name, description, default_config)| {
                (
                    key.to_string(),
                    StrategyInfo {
                        key: key.to_string(),
                        name: name.to_string(),
                        description: description.to_string(),
                        default_config,
                    },
                )
            })
            .collect();

        Self { strategies }
    }

    /// List all available strategies, ordered by key.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get all strategy names.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Create a strategy instance from configuration.
    ///
    /// Missing fields take their defaults; `null` selects the default
    /// configuration.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        match name {
            "hull_suite" => Ok(Box::new(HullSuiteStrategy::new(parse_config(config)?)?)),
            "vwap_bollinger" => Ok(Box::new(VwapBollingerStrategy::new(parse_config(config)?)?)),
            "adx_sma" => Ok(Box::new(AdxSmaStrategy::new(parse_config(config)?)?)),
            "rh_combined" => Ok(Box::new(RhCombinedStrategy::new(parse_config(config)?)?)),
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Strategies declared as data.
//!
//! A definition lists indicator bindings, evaluated in order, and the entry
//! and exit conditions over the resulting columns:
//!
//! ```toml
//! name = "rsi_dip"
//!
//! [[indicators]]
//! name = "rsi"
//! indicator = { kind = "rsi", period = 14 }
//!
//! [enter]
//! type = "compare"
//! left = "rsi"
//! op = "lt"
//! right = 30.0
//!
//! [exit]
//! type = "compare"
//! left = "rsi"
//! op = "gt"
//! right = 70.0
//! ```

use serde::{Deserialize, Serialize};
use signals_core::{Condition, StrategyError, StrategyMetadata, RESERVED_COLUMNS};
use signals_indicators::IndicatorSpec;
use std::path::Path;
use tracing::debug;

use crate::context::AnalysisContext;
use crate::traits::{startup_candles, Strategy};

fn default_source() -> String {
    "close".to_string()
}

/// An indicator written to the table under `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBinding {
    pub name: String,
    /// Input column; ignored by candle indicators such as ATR or VWAP
    #[serde(default = "default_source")]
    pub source: String,
    pub indicator: IndicatorSpec,
}

/// Serialized form of a [`RuleStrategy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStrategyDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: StrategyMetadata,
    /// Overrides the startup length derived from the bindings
    #[serde(default)]
    pub startup_candle_count: Option<usize>,
    #[serde(default)]
    pub indicators: Vec<IndicatorBinding>,
    pub enter: Condition,
    pub exit: Condition,
}

/// Strategy built from a [`RuleStrategyDefinition`].
///
/// Unless given explicitly, the startup length is the longest lookback of
/// the bindings.
#[derive(Debug, Clone)]
pub struct RuleStrategy {
    definition: RuleStrategyDefinition,
}

impl RuleStrategy {
    /// Validate a definition.
    ///
    /// Every binding must have valid parameters and read a column that
    /// exists by the time it runs; every column the conditions reference
    /// must be a candle field or a binding output.
    pub fn new(mut definition: RuleStrategyDefinition) -> Result<Self, StrategyError> {
        if definition.name.trim().is_empty() {
            return Err(StrategyError::InvalidConfig(
                "Strategy name must not be empty".into(),
            ));
        }

        let mut known: Vec<String> = ["open", "high", "low", "close", "volume"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        for binding in &definition.indicators {
            binding.indicator.validate()?;
            if binding.indicator.uses_source() && !known.contains(&binding.source) {
                return Err(StrategyError::UnknownColumn(binding.source.clone()));
            }
            for output in binding.indicator.output_names(&binding.name) {
                if RESERVED_COLUMNS.contains(&output.as_str()) {
                    return Err(StrategyError::InvalidConfig(format!(
                        "binding '{}' would overwrite candle field '{output}'",
                        binding.name
                    )));
                }
                known.push(output);
            }
        }

        for condition in [&definition.enter, &definition.exit] {
            if let Some(missing) = condition
                .columns()
                .into_iter()
                .find(|c| !known.iter().any(|k| k == c))
            {
                return Err(StrategyError::UnknownColumn(missing.to_string()));
            }
        }

        let lookback = startup_candles(definition.indicators.iter().map(|b| &b.indicator));
        definition.metadata.startup_candle_count =
            definition.startup_candle_count.unwrap_or(lookback);

        debug!(
            strategy = %definition.name,
            bindings = definition.indicators.len(),
            startup = definition.metadata.startup_candle_count,
            "Loaded rule strategy"
        );
        Ok(Self { definition })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, StrategyError> {
        let definition =
            toml::from_str(text).map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        Self::new(definition)
    }

    pub fn from_json_str(text: &str) -> Result<Self, StrategyError> {
        let definition =
            serde_json::from_str(text).map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        Self::new(definition)
    }

    /// Load a `.json` or `.toml` definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StrategyError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn definition(&self) -> &RuleStrategyDefinition {
        &self.definition
    }
}

impl Strategy for RuleStrategy {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn metadata(&self) -> &StrategyMetadata {
        &self.definition.metadata
    }

    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        for binding in &self.definition.indicators {
            ctx.bind(&binding.name, &binding.indicator, &binding.source)?;
        }
        Ok(())
    }

    fn entry_condition(&self) -> Condition {
        self.definition.enter.clone()
    }

    fn exit_condition(&self) -> Condition {
        self.definition.exit.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::col;

    fn definition() -> RuleStrategyDefinition {
        RuleStrategyDefinition {
            name: "sma_cross".to_string(),
            description: String::new(),
            metadata: StrategyMetadata::default(),
            startup_candle_count: None,
            indicators: vec![
                IndicatorBinding {
                    name: "fast".to_string(),
                    source: "close".to_string(),
                    indicator: IndicatorSpec::sma(5),
                },
                IndicatorBinding {
                    name: "slow".to_string(),
                    source: "close".to_string(),
                    indicator: IndicatorSpec::sma(20),
                },
            ],
            enter: col("fast").crossed_above("slow"),
            exit: col("fast").crossed_below("slow"),
        }
    }

    #[test]
    fn test_startup_from_longest_lookback() {
        let strategy = RuleStrategy::new(definition()).unwrap();
        assert_eq!(strategy.metadata().startup_candle_count, 20);

        let mut def = definition();
        def.startup_candle_count = Some(50);
        assert_eq!(RuleStrategy::new(def).unwrap().metadata().startup_candle_count, 50);
    }

    #[test]
    fn test_unknown_condition_column() {
        let mut def = definition();
        def.exit = col("rsi").gt(70.0);
        assert!(matches!(
            RuleStrategy::new(def),
            Err(StrategyError::UnknownColumn(c)) if c == "rsi"
        ));
    }

    #[test]
    fn test_binding_reads_later_column_rejected() {
        let mut def = definition();
        def.indicators[0].source = "slow".to_string();
        assert!(RuleStrategy::new(def).is_err());
    }

    #[test]
    fn test_binding_cannot_shadow_candle_field() {
        let mut def = definition();
        def.indicators[0].name = "close".to_string();
        assert!(matches!(
            RuleStrategy::new(def),
            Err(StrategyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_indicator_parameters() {
        let mut def = definition();
        def.indicators[1].indicator = IndicatorSpec::sma(0);
        assert!(matches!(
            RuleStrategy::new(def),
            Err(StrategyError::Indicator(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let strategy = RuleStrategy::from_json_str(
            r#"{
                "name": "rsi_dip",
                "indicators": [{ "name": "rsi", "indicator": { "kind": "rsi", "period": 14 } }],
                "enter": { "type": "compare", "left": "rsi", "op": "lt", "right": 30.0 },
                "exit": { "type": "compare", "left": "rsi", "op": "gt", "right": 70.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(strategy.name(), "rsi_dip");
        assert_eq!(strategy.metadata().startup_candle_count, 15);
        assert_eq!(strategy.definition().indicators[0].source, "close");
    }
}

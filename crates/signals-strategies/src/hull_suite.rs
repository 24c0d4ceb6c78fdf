//! Hull Suite Strategy.
//!
//! Goes long while the selected Hull moving average is rising over the last
//! two candles and exits once it turns down. MACD crossovers can optionally
//! confirm either side.

use serde::{Deserialize, Serialize};
use signals_core::{
    col, Condition, RoiTable, StrategyError, StrategyMetadata, Timeframe,
};
use signals_indicators::{HullVariant, IndicatorSpec};

use crate::context::AnalysisContext;
use crate::traits::{startup_candles, Strategy, StrategyConfig};

const MIN_LENGTH: usize = 27;
const MAX_LENGTH: usize = 200;

/// Configuration for the Hull Suite strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullSuiteConfig {
    /// Window of all three Hull averages
    pub hull_length: usize,
    /// Which average drives entries and exits
    pub trigger: HullVariant,
    /// Require MACD crossing above its signal line to enter
    pub use_macd_entry: bool,
    /// Require the signal line crossing above MACD to exit
    pub use_macd_exit: bool,
}

impl Default for HullSuiteConfig {
    fn default() -> Self {
        Self {
            hull_length: 75,
            trigger: HullVariant::Ehma,
            use_macd_entry: false,
            use_macd_exit: false,
        }
    }
}

impl StrategyConfig for HullSuiteConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.hull_length) {
            return Err(StrategyError::InvalidConfig(format!(
                "hull_length must be in {MIN_LENGTH}..={MAX_LENGTH}, got {}",
                self.hull_length
            )));
        }
        Ok(())
    }
}

fn hull_spec(variant: HullVariant, period: usize) -> IndicatorSpec {
    match variant {
        HullVariant::Hma => IndicatorSpec::Hma { period },
        HullVariant::Thma => IndicatorSpec::Thma { period },
        HullVariant::Ehma => IndicatorSpec::Ehma { period },
    }
}

/// Hull Suite Strategy.
pub struct HullSuiteStrategy {
    config: HullSuiteConfig,
    metadata: StrategyMetadata,
}

impl HullSuiteStrategy {
    /// Create a new Hull Suite strategy.
    pub fn new(config: HullSuiteConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let specs = Self::specs(&config);
        let metadata = StrategyMetadata {
            timeframe: Timeframe::Hour4,
            minimal_roi: RoiTable::new([(0, 10.0)]),
            stoploss: -0.10,
            trailing: None,
            startup_candle_count: startup_candles(&specs),
            use_custom_stoploss: false,
            exit_profit_only: false,
        };
        Ok(Self { config, metadata })
    }

    /// MACD followed by the three Hull averages.
    fn specs(config: &HullSuiteConfig) -> Vec<IndicatorSpec> {
        let mut specs = vec![IndicatorSpec::macd()];
        specs.extend(
            HullVariant::all()
                .into_iter()
                .map(|variant| hull_spec(variant, config.hull_length)),
        );
        specs
    }

    pub fn config(&self) -> &HullSuiteConfig {
        &self.config
    }

    fn trigger_column(&self) -> String {
        self.config.trigger.column_name(self.config.hull_length)
    }
}

impl Strategy for HullSuiteStrategy {
    fn name(&self) -> &str {
        "Hull Suite"
    }

    fn description(&self) -> &str {
        "Follows the slope of a Hull moving average with optional MACD confirmation"
    }

    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        ctx.bind_as(&IndicatorSpec::macd(), "close", &["macd", "macdsignal"])?;

        let length = self.config.hull_length;
        for variant in HullVariant::all() {
            let spec = hull_spec(variant, length);
            ctx.bind(&variant.column_name(length), &spec, "close")?;
        }
        Ok(())
    }

    fn entry_condition(&self) -> Condition {
        let trigger = self.trigger_column();
        let mut conditions = Vec::new();
        if self.config.use_macd_entry {
            conditions.push(col("macd").crossed_above("macdsignal"));
        }
        conditions.push(col(trigger.as_str()).gt(col(trigger.as_str()).shifted(2)));
        conditions.push(col("volume").gt(0.0));
        Condition::all(conditions)
    }

    fn exit_condition(&self) -> Condition {
        let trigger = self.trigger_column();
        let mut conditions = Vec::new();
        if self.config.use_macd_exit {
            conditions.push(col("macdsignal").crossed_above("macd"));
        }
        conditions.push(col(trigger.as_str()).lt(col(trigger.as_str()).shifted(2)));
        conditions.push(col("volume").gt(0.0));
        Condition::all(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::{Candle, CandleTable, NoData};
    use signals_indicators::IndicatorCache;

    fn create_test_table(prices: &[f64]) -> CandleTable {
        let candles = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle::new(i as i64 * 14_400_000, p, p + 1.0, p - 1.0, p, 1000.0))
            .collect();
        CandleTable::new("BTC/USDT", Timeframe::Hour4, candles).unwrap()
    }

    #[test]
    fn test_config_validation() {
        let mut config = HullSuiteConfig::default();
        assert!(config.validate().is_ok());

        config.hull_length = 26;
        assert!(config.validate().is_err());
        config.hull_length = 201;
        assert!(HullSuiteStrategy::new(config).is_err());
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config: HullSuiteConfig =
            serde_json::from_value(serde_json::json!({ "trigger": "thma" })).unwrap();
        assert_eq!(config.hull_length, 75);
        assert_eq!(config.trigger, HullVariant::Thma);
    }

    #[test]
    fn test_populates_all_hull_columns() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let mut table = create_test_table(&prices);
        let strategy = HullSuiteStrategy::new(HullSuiteConfig {
            hull_length: 30,
            ..Default::default()
        })
        .unwrap();

        strategy
            .analyze(&mut table, &NoData, &mut IndicatorCache::new())
            .unwrap();

        for name in ["macd", "macdsignal", "hma_30", "thma_30", "ehma_30", "enter_long", "exit_long"] {
            assert!(table.has_column(name), "missing {name}");
        }
    }

    #[test]
    fn test_rising_prices_enter_and_never_exit() {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let mut table = create_test_table(&prices);
        let strategy = HullSuiteStrategy::new(HullSuiteConfig {
            hull_length: 27,
            trigger: HullVariant::Hma,
            ..Default::default()
        })
        .unwrap();

        let signals = strategy
            .analyze(&mut table, &NoData, &mut IndicatorCache::new())
            .unwrap();

        assert!(signals.enter.get(99));
        assert_eq!(signals.exit.count(), 0);
    }

    #[test]
    fn test_macd_confirmation_adds_crossover() {
        let strategy = HullSuiteStrategy::new(HullSuiteConfig {
            use_macd_entry: true,
            ..Default::default()
        })
        .unwrap();

        let columns = strategy.entry_condition().columns().len();
        assert_eq!(columns, 4);
    }
}

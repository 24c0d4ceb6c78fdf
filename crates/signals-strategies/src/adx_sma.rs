//! ADX-filtered SMA crossover.
//!
//! Enters when the fast SMA crosses the slow SMA from below while ADX shows
//! a strong trend, and exits on the opposite crossover once the trend fades.

use serde::{Deserialize, Serialize};
use signals_core::{col, Condition, RoiTable, StrategyError, StrategyMetadata, Timeframe};
use signals_indicators::IndicatorSpec;

use crate::context::AnalysisContext;
use crate::traits::{startup_candles, Strategy, StrategyConfig};

/// Configuration for the ADX / SMA strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxSmaConfig {
    /// Fast SMA period
    pub fast_period: usize,
    /// Slow SMA period
    pub slow_period: usize,
    pub adx_period: usize,
    /// ADX level separating trending from ranging markets
    pub adx_threshold: f64,
}

impl Default for AdxSmaConfig {
    fn default() -> Self {
        Self {
            fast_period: 3,
            slow_period: 10,
            adx_period: 14,
            adx_threshold: 25.0,
        }
    }
}

impl StrategyConfig for AdxSmaConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.adx_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.adx_threshold) {
            return Err(StrategyError::InvalidConfig(
                "ADX threshold must be within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

impl AdxSmaConfig {
    /// Fast SMA, slow SMA, ADX.
    fn specs(&self) -> [IndicatorSpec; 3] {
        [
            IndicatorSpec::sma(self.fast_period),
            IndicatorSpec::sma(self.slow_period),
            IndicatorSpec::Adx {
                period: self.adx_period,
            },
        ]
    }
}

/// ADX / SMA crossover strategy.
///
/// Column names `sma6` and `sma40` are kept for compatibility with existing
/// plots and exports; they hold the fast and slow averages whatever their
/// configured periods.
pub struct AdxSmaStrategy {
    config: AdxSmaConfig,
    metadata: StrategyMetadata,
}

impl AdxSmaStrategy {
    pub fn new(config: AdxSmaConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let metadata = StrategyMetadata {
            timeframe: Timeframe::Hour1,
            minimal_roi: RoiTable::new([(0, 0.1), (720, 0.075), (1440, 0.05), (2160, 0.025)]),
            stoploss: -0.25,
            startup_candle_count: startup_candles(&config.specs()),
            ..Default::default()
        };
        Ok(Self { config, metadata })
    }
}

impl Strategy for AdxSmaStrategy {
    fn name(&self) -> &str {
        "ADX SMA Crossover"
    }

    fn description(&self) -> &str {
        "Trades fast/slow SMA crossovers filtered by ADX trend strength"
    }

    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        let [fast, slow, adx] = self.config.specs();
        ctx.bind("sma6", &fast, "close")?;
        ctx.bind("sma40", &slow, "close")?;
        ctx.bind("adx", &adx, "close")?;
        Ok(())
    }

    fn entry_condition(&self) -> Condition {
        Condition::all(vec![
            col("adx").gt(self.config.adx_threshold),
            col("sma6").shifted(1).lt("sma40"),
            col("sma6").gt("sma40"),
        ])
    }

    fn exit_condition(&self) -> Condition {
        Condition::all(vec![
            col("adx").lt(self.config.adx_threshold),
            col("sma40").shifted(1).lt("sma6"),
            col("sma40").gt("sma6"),
        ])
    }
}

//! VWAP / Bollinger Strategy.
//!
//! Buys a dip to the lower Bollinger band while every recent candle body has
//! stayed above the daily VWAP, and sells at the upper band. Open trades
//! start with an ATR based stoploss that ratchets up with profit.

use serde::{Deserialize, Serialize};
use signals_core::{
    col, CandleTable, Condition, RoiTable, StrategyError, StrategyMetadata, Timeframe,
};
use signals_indicators::{volume::TREND_ABOVE, IndicatorSpec, VwapAnchor};
use signals_risk::{RatchetStoploss, StoplossQuery, StoplossStore};

use crate::context::AnalysisContext;
use crate::traits::{startup_candles, Strategy, StrategyConfig};

/// Configuration for the VWAP / Bollinger strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapBollingerConfig {
    pub atr_period: usize,
    /// ATR multiples below close for the initial stoploss
    pub atr_multiplier: f64,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    /// Candles before the current one that must sit above VWAP
    pub backcandles: usize,
    pub rsi_entry: f64,
    pub rsi_exit: f64,
    pub stoploss: RatchetStoploss,
}

impl Default for VwapBollingerConfig {
    fn default() -> Self {
        Self {
            atr_period: 150,
            atr_multiplier: 3.5,
            ema_period: 200,
            rsi_period: 16,
            bb_period: 14,
            bb_std_dev: 2.0,
            backcandles: 15,
            rsi_entry: 45.0,
            rsi_exit: 55.0,
            stoploss: RatchetStoploss::default(),
        }
    }
}

impl StrategyConfig for VwapBollingerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        self.specs()
            .iter()
            .try_for_each(|(_, spec)| spec.validate())?;
        if !(self.atr_multiplier.is_finite() && self.atr_multiplier > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "ATR multiplier must be positive".into(),
            ));
        }
        if self.rsi_entry >= self.rsi_exit {
            return Err(StrategyError::InvalidConfig(
                "RSI entry level must be below the exit level".into(),
            ));
        }
        RatchetStoploss::new(self.stoploss.min_profit, self.stoploss.profit_divisor)?;
        Ok(())
    }
}

impl VwapBollingerConfig {
    fn specs(&self) -> [(&'static str, IndicatorSpec); 6] {
        [
            ("vwap", IndicatorSpec::Vwap { anchor: VwapAnchor::Daily }),
            ("atr", IndicatorSpec::Atr {
                period: self.atr_period,
                smoothing: Default::default(),
            }),
            ("ema200", IndicatorSpec::ema(self.ema_period)),
            ("rsi", IndicatorSpec::rsi(self.rsi_period)),
            ("bb", IndicatorSpec::bollinger(self.bb_period, self.bb_std_dev)),
            ("vwap_signal", IndicatorSpec::VwapTrend {
                backcandles: self.backcandles,
                anchor: VwapAnchor::Daily,
            }),
        ]
    }
}

/// VWAP / Bollinger Strategy.
pub struct VwapBollingerStrategy {
    config: VwapBollingerConfig,
    metadata: StrategyMetadata,
}

impl VwapBollingerStrategy {
    pub fn new(config: VwapBollingerConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let metadata = StrategyMetadata {
            timeframe: Timeframe::Minute5,
            minimal_roi: RoiTable::new([(0, 1.0)]),
            stoploss: -0.2,
            trailing: None,
            startup_candle_count: startup_candles(config.specs().iter().map(|(_, spec)| spec)),
            use_custom_stoploss: true,
            exit_profit_only: true,
        };
        Ok(Self { config, metadata })
    }

    pub fn config(&self) -> &VwapBollingerConfig {
        &self.config
    }
}

impl Strategy for VwapBollingerStrategy {
    fn name(&self) -> &str {
        "VWAP Bollinger"
    }

    fn description(&self) -> &str {
        "Buys lower Bollinger band touches during a VWAP uptrend with a ratcheting ATR stoploss"
    }

    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        for (name, spec) in self.config.specs() {
            match spec {
                IndicatorSpec::Bollinger { .. } => {
                    ctx.bind_as(&spec, "close", &["upper_band", "middle_band", "lower_band"])?;
                }
                _ => {
                    ctx.bind(name, &spec, "close")?;
                }
            }
        }

        let atr_stoploss = {
            let close = ctx.column("close")?;
            let offset = ctx.column("atr")? * self.config.atr_multiplier;
            close.try_sub(&offset).map_err(StrategyError::from)?
        };
        ctx.insert("atr_stoploss", atr_stoploss)
    }

    fn entry_condition(&self) -> Condition {
        Condition::all(vec![
            col("volume").gt(0.0),
            col("vwap_signal").equals(TREND_ABOVE),
            col("rsi").lt(self.config.rsi_entry),
            col("close").le("lower_band"),
            col("close").shifted(1).le(col("lower_band").shifted(1)),
            col("lower_band").not_equals("upper_band"),
        ])
    }

    fn exit_condition(&self) -> Condition {
        Condition::all(vec![
            col("volume").gt(0.0),
            col("close").ge("upper_band"),
            col("rsi").gt(self.config.rsi_exit),
            col("lower_band").not_equals("upper_band"),
        ])
    }

    fn custom_stoploss(
        &self,
        query: &StoplossQuery,
        table: &CandleTable,
        store: &mut dyn StoplossStore,
    ) -> Option<f64> {
        let atr_stop = table.column("atr_stoploss").and_then(|s| s.last());
        self.config.stoploss.evaluate(query, atr_stop, store)
    }
}

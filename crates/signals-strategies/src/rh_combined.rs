//! RH Combined Strategy.
//!
//! Two dip-buying setups joined by OR, both gated on the BTC trend taken
//! from an informative BTC/USDT table:
//! - BinHV45: a sharp drop through the lower 40-candle Bollinger band with
//!   a short lower tail
//! - ClucMay: close well under the typical-price Bollinger band and the
//!   EMA without a volume spike
//!
//! Positions are closed once price is back above the middle band.

use serde::{Deserialize, Serialize};
use signals_core::{
    col, Condition, InformativePair, RoiTable, Series, StrategyError, StrategyMetadata, Timeframe,
    TrailingStop,
};
use signals_data::{informative_column, merge_informative_with, MergeAlignment};
use signals_indicators::IndicatorSpec;
use tracing::warn;

use crate::context::AnalysisContext;
use crate::traits::{startup_candles, Strategy, StrategyConfig};

// Informative column names; they keep the default periods in their names.
const BTC_FAST: &str = "sma50";
const BTC_SLOW: &str = "sma200";

/// Configuration for the RH Combined strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhCombinedConfig {
    pub informative_pair: String,
    pub informative_timeframe: Timeframe,
    /// How BTC rows are matched to primary candles
    pub informative_alignment: MergeAlignment,
    pub btc_fast_period: usize,
    pub btc_slow_period: usize,
    /// Minimum `(fast - slow) / fast` of the BTC SMAs, in percent
    pub min_btc_sma_delta: f64,
    /// Minimum relative width of the typical-price bands
    pub min_bb_width: f64,
    /// Minimum share of the candle's drop that is body, in percent
    pub min_body_pct: f64,
}

impl Default for RhCombinedConfig {
    fn default() -> Self {
        Self {
            informative_pair: "BTC/USDT".to_string(),
            informative_timeframe: Timeframe::Minute5,
            informative_alignment: MergeAlignment::OpenTime,
            btc_fast_period: 50,
            btc_slow_period: 200,
            min_btc_sma_delta: -2.0,
            min_bb_width: 0.045,
            min_body_pct: 70.0,
        }
    }
}

impl StrategyConfig for RhCombinedConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.informative_pair.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "Informative pair must not be empty".into(),
            ));
        }
        if self.btc_fast_period == 0 || self.btc_fast_period >= self.btc_slow_period {
            return Err(StrategyError::InvalidConfig(
                "BTC fast period must be positive and less than the slow period".into(),
            ));
        }
        if self.informative_timeframe < Timeframe::Minute5 {
            return Err(StrategyError::InvalidConfig(format!(
                "Informative timeframe {} is faster than the 5m primary timeframe",
                self.informative_timeframe
            )));
        }
        Ok(())
    }
}

// Indicators bound on the primary table.
fn bin_hv45_bands() -> IndicatorSpec {
    IndicatorSpec::bollinger(40, 2.0)
}

fn cluc_may_bands() -> IndicatorSpec {
    IndicatorSpec::bollinger(20, 2.0)
}

fn cluc_may_ema() -> IndicatorSpec {
    IndicatorSpec::ema(50)
}

fn volume_mean() -> IndicatorSpec {
    IndicatorSpec::sma(30)
}

/// RH Combined Strategy.
pub struct RhCombinedStrategy {
    config: RhCombinedConfig,
    metadata: StrategyMetadata,
}

impl RhCombinedStrategy {
    pub fn new(config: RhCombinedConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let metadata = StrategyMetadata {
            timeframe: Timeframe::Minute5,
            minimal_roi: RoiTable::new([(0, 0.143), (10, 0.035), (58, 0.016), (93, 0.0)]),
            stoploss: -0.347,
            trailing: Some(TrailingStop {
                positive: 0.217,
                positive_offset: 0.23,
                only_offset_is_reached: true,
            }),
            startup_candle_count: startup_candles(&[
                bin_hv45_bands(),
                cluc_may_bands(),
                cluc_may_ema(),
                volume_mean(),
            ]),
            use_custom_stoploss: false,
            exit_profit_only: false,
        };
        Ok(Self { config, metadata })
    }

    fn btc_columns(&self) -> (String, String) {
        let tf = self.config.informative_timeframe;
        (
            informative_column(BTC_FAST, tf),
            informative_column(BTC_SLOW, tf),
        )
    }

    /// Merge the BTC SMAs, or leave them undefined when the host has no
    /// informative table.
    fn populate_informative(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        let pair = &self.config.informative_pair;
        let tf = self.config.informative_timeframe;

        let Some(informative) = ctx.data().table(pair, tf) else {
            warn!(pair = %pair, timeframe = %tf, "Informative data missing, BTC filter disabled");
            let (fast, slow) = self.btc_columns();
            let n = ctx.table().len();
            ctx.insert(&fast, Series::undefined(n))?;
            ctx.insert(&slow, Series::undefined(n))?;
            return Ok(());
        };

        let cache = ctx.cache_mut();
        let fast = cache.get_or_compute(informative, &IndicatorSpec::sma(self.config.btc_fast_period), "close")?;
        let slow = cache.get_or_compute(informative, &IndicatorSpec::sma(self.config.btc_slow_period), "close")?;

        let mut annotated = informative.clone();
        for (name, outputs) in [(BTC_FAST, fast), (BTC_SLOW, slow)] {
            if let Some(series) = outputs.into_iter().next() {
                annotated.insert_column(name, series)?;
            }
        }
        merge_informative_with(
            ctx.table_mut(),
            &annotated,
            &[BTC_FAST, BTC_SLOW],
            self.config.informative_alignment,
        )?;
        Ok(())
    }

    fn setup_filters(&self) -> Vec<Condition> {
        vec![
            col("btc_sma_delta").gt(self.config.min_btc_sma_delta),
            col("bb_width").gt(self.config.min_bb_width),
            col("body_pct").gt(self.config.min_body_pct),
        ]
    }
}

impl Strategy for RhCombinedStrategy {
    fn name(&self) -> &str {
        "RH Combined"
    }

    fn description(&self) -> &str {
        "BinHV45 or ClucMay dip entries filtered by the BTC SMA trend"
    }

    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn informative_pairs(&self) -> Vec<InformativePair> {
        vec![InformativePair::new(
            self.config.informative_pair.clone(),
            self.config.informative_timeframe,
        )]
    }

    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError> {
        self.populate_informative(ctx)?;

        // BinHV45
        ctx.bind_as(&bin_hv45_bands(), "close", &["upper", "mid", "lower"])?;
        let (bbdelta, closedelta, tail) = {
            let close = ctx.column("close")?;
            (
                ctx.column("mid")?.try_sub(ctx.column("lower")?)?.abs(),
                close.diff(1).abs(),
                close.try_sub(ctx.column("low")?)?.abs(),
            )
        };
        ctx.insert("bbdelta", bbdelta)?;
        ctx.insert("closedelta", closedelta)?;
        ctx.insert("tail", tail)?;

        // ClucMay
        ctx.bind("typical_price", &IndicatorSpec::TypicalPrice, "close")?;
        ctx.bind_as(
            &cluc_may_bands(),
            "typical_price",
            &["bb_upperband", "bb_middleband", "bb_lowerband"],
        )?;
        ctx.bind("ema100", &cluc_may_ema(), "close")?;
        ctx.bind("volume_mean_slow", &volume_mean(), "volume")?;

        // Filters shared by both setups
        let (fast_column, slow_column) = self.btc_columns();
        let (btc_sma_delta, body_pct, bb_width) = {
            let fast = ctx.column(&fast_column)?;
            let slow = ctx.column(&slow_column)?;
            let open = ctx.column("open")?;
            let close = ctx.column("close")?;
            let low = ctx.column("low")?;
            let upper = ctx.column("bb_upperband")?;
            let middle = ctx.column("bb_middleband")?;
            let lower = ctx.column("bb_lowerband")?;
            (
                fast.try_sub(slow)?.try_div(fast)? * 100.0,
                (open.try_sub(close)? * 100.0).try_div(&open.try_sub(low)?)?,
                upper.try_sub(lower)?.try_div(middle)?,
            )
        };
        ctx.insert("btc_sma_delta", btc_sma_delta)?;
        ctx.insert("body_pct", body_pct)?;
        ctx.insert("bb_width", bb_width)
    }

    fn entry_condition(&self) -> Condition {
        let mut bin_hv45 = self.setup_filters();
        bin_hv45.extend([
            col("lower").shifted(1).gt(0.0),
            col("bbdelta").gt(col("close").scaled(0.008)),
            col("closedelta").gt(col("close").scaled(0.0175)),
            col("tail").lt(col("bbdelta").scaled(0.25)),
            col("close").lt(col("lower").shifted(1)),
            col("close").le(col("close").shifted(1)),
            col("volume").gt(0.0),
        ]);

        let mut cluc_may = self.setup_filters();
        cluc_may.extend([
            col("close").lt("ema100"),
            col("close").lt(col("bb_lowerband").scaled(0.985)),
            col("volume").lt(col("volume_mean_slow").shifted(1).scaled(20.0)),
            col("volume").gt(0.0),
        ]);

        Condition::any(vec![Condition::all(bin_hv45), Condition::all(cluc_may)])
    }

    fn exit_condition(&self) -> Condition {
        col("close").gt("bb_middleband")
    }
}

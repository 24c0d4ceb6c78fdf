//! Strategy trait definitions.

use signals_core::{
    CandleTable, Condition, DataProvider, InformativePair, SignalRule, Signals, StrategyError,
    StrategyMetadata,
};
use signals_indicators::{IndicatorCache, IndicatorSpec};
use signals_risk::{StoplossQuery, StoplossStore};
use tracing::{debug, info};

use crate::context::AnalysisContext;

/// Startup length covering every indicator in `specs`: the longest lookback.
pub fn startup_candles<'a>(specs: impl IntoIterator<Item = &'a IndicatorSpec>) -> usize {
    specs.into_iter().map(IndicatorSpec::lookback).max().unwrap_or(0)
}

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A strategy annotates a candle table with indicator columns and derives
/// per-candle entry and exit flags from them. Parameters are fixed at
/// construction; analysis never mutates the strategy.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Timeframe, ROI table, stoploss and startup length.
    fn metadata(&self) -> &StrategyMetadata;

    /// Additional (pair, timeframe) tables the strategy reads.
    fn informative_pairs(&self) -> Vec<InformativePair> {
        Vec::new()
    }

    /// Add every derived column the signal rules need.
    fn populate_indicators(&self, ctx: &mut AnalysisContext<'_>) -> Result<(), StrategyError>;

    fn entry_condition(&self) -> Condition;

    fn exit_condition(&self) -> Condition;

    fn signal_rule(&self) -> SignalRule {
        SignalRule {
            enter: self.entry_condition(),
            exit: self.exit_condition(),
        }
    }

    /// Per-trade stoploss override. `None` leaves the host default in place.
    fn custom_stoploss(
        &self,
        _query: &StoplossQuery,
        _table: &CandleTable,
        _store: &mut dyn StoplossStore,
    ) -> Option<f64> {
        None
    }

    /// Run the full analysis over `table`.
    ///
    /// Indicators are populated, the signal rules evaluated and the
    /// `enter_long` / `exit_long` columns attached. Derived columns and
    /// signals before `startup_candle_count - 1` are cleared, so a table
    /// shorter than the startup length produces no signals.
    fn analyze(
        &self,
        table: &mut CandleTable,
        data: &dyn DataProvider,
        cache: &mut IndicatorCache,
    ) -> Result<Signals, StrategyError> {
        debug!(
            strategy = self.name(),
            pair = table.pair(),
            candles = table.len(),
            "analyzing"
        );

        {
            let mut ctx = AnalysisContext::new(table, data, cache);
            self.populate_indicators(&mut ctx)?;
        }

        let mut signals = self.signal_rule().evaluate(table)?;
        let warmup = self.metadata().startup_candle_count.saturating_sub(1);
        signals.clear_prefix(warmup);
        table.mask_warmup(warmup);
        signals.attach(table)?;

        info!(
            strategy = self.name(),
            pair = table.pair(),
            entries = signals.enter.count(),
            exits = signals.exit.count(),
            "analysis complete"
        );
        Ok(signals)
    }
}

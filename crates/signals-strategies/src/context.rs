//! Mutable state handed to a strategy while it annotates a table.

use signals_core::{CandleTable, DataProvider, Series, StrategyError};
use signals_indicators::{IndicatorCache, IndicatorSpec};
use tracing::trace;

/// The primary table being annotated, the host's other tables, and the
/// indicator cache shared across runs.
pub struct AnalysisContext<'a> {
    table: &'a mut CandleTable,
    data: &'a dyn DataProvider,
    cache: &'a mut IndicatorCache,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        table: &'a mut CandleTable,
        data: &'a dyn DataProvider,
        cache: &'a mut IndicatorCache,
    ) -> Self {
        Self { table, data, cache }
    }

    pub fn table(&self) -> &CandleTable {
        &*self.table
    }

    pub fn table_mut(&mut self) -> &mut CandleTable {
        &mut *self.table
    }

    pub fn data(&self) -> &'a dyn DataProvider {
        self.data
    }

    pub fn cache_mut(&mut self) -> &mut IndicatorCache {
        &mut *self.cache
    }

    /// Compute `spec` over `source` and store its outputs under the
    /// default names derived from `name`. Returns the written column names.
    pub fn bind(
        &mut self,
        name: &str,
        spec: &IndicatorSpec,
        source: &str,
    ) -> Result<Vec<String>, StrategyError> {
        let names = spec.output_names(name);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.bind_as(spec, source, &refs)?;
        Ok(names)
    }

    /// Compute `spec` over `source` and store the outputs under `names`,
    /// in output order. Outputs without a name are discarded.
    pub fn bind_as(
        &mut self,
        spec: &IndicatorSpec,
        source: &str,
        names: &[&str],
    ) -> Result<(), StrategyError> {
        let outputs = self.cache.get_or_compute(&*self.table, spec, source)?;
        for (name, series) in names.iter().zip(outputs) {
            trace!(column = name, indicator = %spec, source, "binding indicator");
            self.table.insert_column(*name, series)?;
        }
        Ok(())
    }

    /// Store a computed series as a derived column.
    pub fn insert(&mut self, name: &str, series: Series) -> Result<(), StrategyError> {
        self.table.insert_column(name, series)?;
        Ok(())
    }

    /// A base or derived column.
    pub fn column(&self, name: &str) -> Result<&Series, StrategyError> {
        self.table
            .column(name)
            .ok_or_else(|| StrategyError::UnknownColumn(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::{Candle, NoData, Timeframe};

    fn table() -> CandleTable {
        let candles = (0..40)
            .map(|i| {
                let p = 100.0 + (i as f64 * 0.3).sin();
                Candle::new(i as i64 * 300_000, p, p + 0.5, p - 0.5, p, 10.0)
            })
            .collect();
        CandleTable::new("ETH/USDT", Timeframe::Minute5, candles).unwrap()
    }

    #[test]
    fn test_bind_uses_default_names() {
        let mut t = table();
        let mut cache = IndicatorCache::new();
        let mut ctx = AnalysisContext::new(&mut t, &NoData, &mut cache);

        let names = ctx.bind("bb", &IndicatorSpec::bollinger(20, 2.0), "close").unwrap();
        assert_eq!(names, vec!["bb_upper", "bb_mid", "bb_lower"]);
        assert!(ctx.column("bb_mid").unwrap().get(19).is_some());
    }

    #[test]
    fn test_bind_as_truncates_names() {
        let mut t = table();
        let mut cache = IndicatorCache::new();
        let mut ctx = AnalysisContext::new(&mut t, &NoData, &mut cache);

        ctx.bind_as(&IndicatorSpec::macd(), "close", &["macd", "macdsignal"]).unwrap();
        assert!(ctx.table().has_column("macdsignal"));
        assert!(!ctx.table().has_column("macd_hist"));
    }

    #[test]
    fn test_later_binding_reads_earlier_column() {
        let mut t = table();
        let mut cache = IndicatorCache::new();
        let mut ctx = AnalysisContext::new(&mut t, &NoData, &mut cache);

        ctx.bind("tp", &IndicatorSpec::TypicalPrice, "close").unwrap();
        ctx.bind("tp_sma", &IndicatorSpec::sma(5), "tp").unwrap();
        assert!(ctx.column("tp_sma").unwrap().get(4).is_some());
        assert!(ctx.bind("x", &IndicatorSpec::sma(5), "missing").is_err());
    }
}

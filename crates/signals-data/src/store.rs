//! In-memory candle tables keyed by pair and timeframe.

use std::collections::HashMap;

use signals_core::{CandleTable, DataProvider, Timeframe};
use tracing::debug;

/// Holds the tables a host makes available to strategies.
#[derive(Debug, Default)]
pub struct CandleStore {
    tables: HashMap<(String, Timeframe), CandleTable>,
}

impl CandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the table for its own pair and timeframe.
    pub fn insert(&mut self, table: CandleTable) -> Option<CandleTable> {
        let key = (table.pair().to_string(), table.timeframe());
        debug!(pair = %key.0, timeframe = %key.1, candles = table.len(), "Storing table");
        self.tables.insert(key, table)
    }

    pub fn get_mut(&mut self, pair: &str, timeframe: Timeframe) -> Option<&mut CandleTable> {
        self.tables.get_mut(&(pair.to_string(), timeframe))
    }

    pub fn remove(&mut self, pair: &str, timeframe: Timeframe) -> Option<CandleTable> {
        self.tables.remove(&(pair.to_string(), timeframe))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, Timeframe)> {
        self.tables.keys().map(|(pair, tf)| (pair.as_str(), *tf))
    }
}

impl DataProvider for CandleStore {
    fn table(&self, pair: &str, timeframe: Timeframe) -> Option<&CandleTable> {
        self.tables.get(&(pair.to_string(), timeframe))
    }
}

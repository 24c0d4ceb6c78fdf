//! Memoisation of computed indicator columns.

use std::collections::HashMap;

use signals_core::{CandleTable, IndicatorError, Series};
use tracing::trace;

use crate::spec::IndicatorSpec;

/// One cache slot per indicator, source column and table lineage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    indicator: String,
    /// Source column; `None` for candle indicators.
    source: Option<String>,
    lineage: u64,
}

/// What the cached outputs were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    table: u64,
    revision: Option<u64>,
}

#[derive(Debug)]
struct Entry {
    stamp: Stamp,
    values: Vec<Series>,
}

/// Cache of indicator outputs.
///
/// A slot holds the outputs of one indicator over one source column of one
/// table lineage, stamped with the table id and the source revision they
/// were computed from. A lookup with a different stamp recomputes and
/// overwrites the slot, so replacing a column, masking a warm-up or
/// appending a candle never returns stale values and never leaves
/// unreachable entries behind.
#[derive(Debug, Default)]
pub struct IndicatorCache {
    entries: HashMap<SlotKey, Entry>,
    hits: u64,
    misses: u64,
}

impl IndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outputs for `spec` over `source`, computing them on a miss.
    pub fn get_or_compute(
        &mut self,
        table: &CandleTable,
        spec: &IndicatorSpec,
        source: &str,
    ) -> Result<Vec<Series>, IndicatorError> {
        let (slot, stamp) = Self::key(table, spec, source)?;
        if let Some(entry) = self.entries.get(&slot) {
            if entry.stamp == stamp {
                self.hits += 1;
                trace!(indicator = %slot.indicator, table = stamp.table, "indicator cache hit");
                return Ok(entry.values.clone());
            }
        }

        self.misses += 1;
        trace!(indicator = %slot.indicator, table = stamp.table, "indicator cache miss");
        let values = spec.compute(table, source)?;
        self.entries.insert(
            slot,
            Entry {
                stamp,
                values: values.clone(),
            },
        );
        Ok(values)
    }

    pub fn contains(&self, table: &CandleTable, spec: &IndicatorSpec, source: &str) -> bool {
        match Self::key(table, spec, source) {
            Ok((slot, stamp)) => self
                .entries
                .get(&slot)
                .is_some_and(|entry| entry.stamp == stamp),
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn key(
        table: &CandleTable,
        spec: &IndicatorSpec,
        source: &str,
    ) -> Result<(SlotKey, Stamp), IndicatorError> {
        let (source, revision) = if spec.uses_source() {
            let revision = table
                .revision(source)
                .ok_or_else(|| IndicatorError::UnknownColumn(source.to_string()))?;
            (Some(source.to_string()), Some(revision))
        } else {
            (None, None)
        };
        let slot = SlotKey {
            indicator: spec.to_string(),
            source,
            lineage: table.lineage(),
        };
        let stamp = Stamp {
            table: table.id(),
            revision,
        };
        Ok((slot, stamp))
    }
}

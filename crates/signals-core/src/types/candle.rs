//! Candle data and the column-oriented candle table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DataError;
use crate::types::{Series, Timeframe};

/// Column names owned by the candle fields; derived columns cannot use them.
pub const RESERVED_COLUMNS: &[&str] = &["date", "timestamp", "open", "high", "low", "close", "volume"];

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_table_id() -> u64 {
    NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// One OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time, unix milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True range against the previous close; undefined without one.
    pub fn true_range(&self, prev_close: Option<f64>) -> Option<f64> {
        prev_close.map(|pc| {
            let hl = self.high - self.low;
            let hc = (self.high - pc).abs();
            let lc = (self.low - pc).abs();
            hl.max(hc).max(lc)
        })
    }

    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    values: Series,
    revision: u64,
}

/// Ordered candles for one (pair, timeframe) plus derived columns.
///
/// Candle fields are fixed at construction. Derived columns are appended in
/// insertion order; re-inserting a name replaces the column and bumps its
/// revision. Each table carries a process-unique id, and a clone receives a
/// fresh one, so `(id, column, revision)` identifies column contents.
/// [`CandleTable::push_candle`] also assigns a new id but keeps the
/// table's lineage.
#[derive(Debug)]
pub struct CandleTable {
    id: u64,
    lineage: u64,
    pair: String,
    timeframe: Timeframe,
    timestamps: Vec<i64>,
    open: Series,
    high: Series,
    low: Series,
    close: Series,
    volume: Series,
    columns: Vec<Column>,
    next_revision: u64,
}

impl CandleTable {
    /// Build a table, validating strictly increasing timestamps.
    pub fn new(
        pair: impl Into<String>,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Result<Self, DataError> {
        if let Some(index) = candles
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(DataError::NotMonotonic { index: index + 1 });
        }

        let id = next_table_id();
        Ok(Self {
            id,
            lineage: id,
            pair: pair.into(),
            timeframe,
            timestamps: candles.iter().map(|c| c.timestamp).collect(),
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            close: candles.iter().map(|c| c.close).collect(),
            volume: candles.iter().map(|c| c.volume).collect(),
            columns: Vec::new(),
            next_revision: 1,
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Id shared by every version of this table grown with `push_candle`.
    #[inline]
    pub fn lineage(&self) -> u64 {
        self.lineage
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Candle at `index` (0 = oldest).
    pub fn candle(&self, index: usize) -> Option<Candle> {
        let timestamp = *self.timestamps.get(index)?;
        Some(Candle {
            timestamp,
            open: self.open.values()[index],
            high: self.high.values()[index],
            low: self.low.values()[index],
            close: self.close.values()[index],
            volume: self.volume.values()[index],
        })
    }

    pub fn last_candle(&self) -> Option<Candle> {
        self.len().checked_sub(1).and_then(|i| self.candle(i))
    }

    pub fn candles(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).filter_map(move |i| self.candle(i))
    }

    pub fn open(&self) -> &Series {
        &self.open
    }

    pub fn high(&self) -> &Series {
        &self.high
    }

    pub fn low(&self) -> &Series {
        &self.low
    }

    pub fn close(&self) -> &Series {
        &self.close
    }

    pub fn volume(&self) -> &Series {
        &self.volume
    }

    /// Look up a candle field or derived column by name.
    pub fn column(&self, name: &str) -> Option<&Series> {
        match name {
            "open" => Some(&self.open),
            "high" => Some(&self.high),
            "low" => Some(&self.low),
            "close" => Some(&self.close),
            "volume" => Some(&self.volume),
            _ => self
                .columns
                .iter()
                .find(|c| c.name == name)
                .map(|c| &c.values),
        }
    }

    /// Like [`column`](Self::column) but fails with `UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<&Series, DataError> {
        self.column(name)
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Revision of a column; candle fields are always revision 0.
    pub fn revision(&self, name: &str) -> Option<u64> {
        match name {
            "open" | "high" | "low" | "close" | "volume" => Some(0),
            _ => self
                .columns
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.revision),
        }
    }

    /// Insert or replace a derived column.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Series) -> Result<(), DataError> {
        let name = name.into();
        if RESERVED_COLUMNS.contains(&name.as_str()) {
            return Err(DataError::ReservedColumn(name));
        }
        if values.len() != self.len() {
            return Err(DataError::Alignment(format!(
                "column '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.len()
            )));
        }

        let revision = self.bump_revision();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => {
                column.values = values;
                column.revision = revision;
            }
            None => self.columns.push(Column {
                name,
                values,
                revision,
            }),
        }
        Ok(())
    }

    /// Remove a derived column, returning its values.
    pub fn remove_column(&mut self, name: &str) -> Option<Series> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(index).values)
    }

    /// Derived column names in insertion order.
    pub fn derived_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Candle field names followed by derived column names.
    pub fn column_names(&self) -> Vec<&str> {
        ["open", "high", "low", "close", "volume"]
            .into_iter()
            .chain(self.derived_columns())
            .collect()
    }

    /// Mark positions `0..count` of every derived column undefined.
    pub fn mask_warmup(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        for i in 0..self.columns.len() {
            let revision = self.bump_revision();
            let column = &mut self.columns[i];
            column.values.clear_prefix(count);
            column.revision = revision;
        }
    }

    /// Append a newer candle. Derived columns are dropped and the table
    /// receives a new identity.
    pub fn push_candle(&mut self, candle: Candle) -> Result<(), DataError> {
        if let Some(&last) = self.timestamps.last() {
            if candle.timestamp <= last {
                return Err(DataError::NotMonotonic { index: self.len() });
            }
        }

        let mut candles: Vec<Candle> = self.candles().collect();
        candles.push(candle);
        let mut rebuilt = CandleTable::new(self.pair.clone(), self.timeframe, candles)?;
        rebuilt.lineage = self.lineage;
        *self = rebuilt;
        Ok(())
    }

    fn bump_revision(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }
}

impl Clone for CandleTable {
    fn clone(&self) -> Self {
        let id = next_table_id();
        Self {
            id,
            lineage: id,
            pair: self.pair.clone(),
            timeframe: self.timeframe,
            timestamps: self.timestamps.clone(),
            open: self.open.clone(),
            high: self.high.clone(),
            low: self.low.clone(),
            close: self.close.clone(),
            volume: self.volume.clone(),
            columns: self.columns.clone(),
            next_revision: self.next_revision,
        }
    }
}

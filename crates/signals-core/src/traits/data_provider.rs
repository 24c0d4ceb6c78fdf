//! Access to additional candle tables during analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{CandleTable, Timeframe};

/// A (pair, timeframe) a strategy reads besides its primary table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InformativePair {
    pub pair: String,
    pub timeframe: Timeframe,
}

impl InformativePair {
    pub fn new(pair: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
        }
    }
}

impl fmt::Display for InformativePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pair, self.timeframe)
    }
}

/// Read-only lookup of candle tables supplied by the host.
pub trait DataProvider {
    /// Table for `(pair, timeframe)`, if the host has one.
    fn table(&self, pair: &str, timeframe: Timeframe) -> Option<&CandleTable>;
}

/// Provider with no tables at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData;

impl DataProvider for NoData {
    fn table(&self, _pair: &str, _timeframe: Timeframe) -> Option<&CandleTable> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data() {
        assert!(NoData.table("BTC/USDT", Timeframe::Minute5).is_none());
        assert_eq!(
            InformativePair::new("BTC/USDT", Timeframe::Minute5).to_string(),
            "BTC/USDT 5m"
        );
    }
}

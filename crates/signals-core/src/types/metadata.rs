//! Per-strategy metadata consumed by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Timeframe;

/// Minimal-ROI table: minutes since entry → required profit ratio.
///
/// Serialized as a map with string keys (`{"0": 0.1, "720": 0.075}`) so it
/// round-trips through JSON and TOML alike.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RoiTable {
    entries: BTreeMap<u32, f64>,
}

impl TryFrom<BTreeMap<String, f64>> for RoiTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(minutes, ratio)| {
                minutes
                    .trim()
                    .parse::<u32>()
                    .map(|m| (m, ratio))
                    .map_err(|_| format!("invalid ROI offset '{minutes}', expected minutes"))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(|entries| Self { entries })
    }
}

impl From<RoiTable> for BTreeMap<String, f64> {
    fn from(table: RoiTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(minutes, ratio)| (minutes.to_string(), ratio))
            .collect()
    }
}

impl RoiTable {
    pub fn new(entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Threshold of the largest offset not exceeding `minutes`.
    pub fn threshold_at(&self, minutes: u32) -> Option<f64> {
        self.entries.range(..=minutes).next_back().map(|(_, v)| *v)
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trailing stop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    pub positive: f64,
    pub positive_offset: f64,
    pub only_offset_is_reached: bool,
}

/// Static facts a strategy exposes to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyMetadata {
    pub timeframe: Timeframe,
    pub minimal_roi: RoiTable,
    /// Hard stoploss as a negative ratio (e.g. -0.10)
    pub stoploss: f64,
    pub trailing: Option<TrailingStop>,
    /// Candles needed before derived columns are trusted
    pub startup_candle_count: usize,
    pub use_custom_stoploss: bool,
    pub exit_profit_only: bool,
}

impl Default for StrategyMetadata {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Minute5,
            minimal_roi: RoiTable::new([(0, 0.1)]),
            stoploss: -0.10,
            trailing: None,
            startup_candle_count: 0,
            use_custom_stoploss: false,
            exit_profit_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_threshold_lookup() {
        let roi = RoiTable::new([(0, 0.1), (720, 0.075), (1440, 0.05), (2160, 0.025)]);

        assert_eq!(roi.threshold_at(0), Some(0.1));
        assert_eq!(roi.threshold_at(719), Some(0.1));
        assert_eq!(roi.threshold_at(720), Some(0.075));
        assert_eq!(roi.threshold_at(10_000), Some(0.025));
    }

    #[test]
    fn test_roi_serializes_as_map() {
        let roi = RoiTable::new([(0, 0.143), (10, 0.035)]);
        let json = serde_json::to_string(&roi).unwrap();
        assert_eq!(json, r#"{"0":0.143,"10":0.035}"#);

        let back: RoiTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roi);
    }

    #[test]
    fn test_roi_from_toml() {
        let metadata: StrategyMetadata = toml::from_str(
            r#"
            timeframe = "1h"
            stoploss = -0.25
            startup_candle_count = 0
            use_custom_stoploss = false
            exit_profit_only = false

            [minimal_roi]
            "0" = 0.1
            "720" = 0.075
            "#,
        )
        .unwrap();

        assert_eq!(metadata.minimal_roi.threshold_at(721), Some(0.075));
        assert!(metadata.trailing.is_none());
        assert!(toml::from_str::<RoiTable>(r#"soon = 0.1"#).is_err());
    }
}

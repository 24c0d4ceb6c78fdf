//! Volume-weighted indicators.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use signals_core::{CandleIndicator, CandleTable, IndicatorError, Series};

/// `(high + low + close) / 3` per candle.
pub fn typical_price(table: &CandleTable) -> Series {
    table
        .candles()
        .map(|c| c.typical_price())
        .collect()
}

/// Typical price as a [`CandleIndicator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypicalPrice;

impl CandleIndicator for TypicalPrice {
    fn calculate(&self, table: &CandleTable) -> Series {
        typical_price(table)
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "TYPPRICE"
    }
}

/// Session boundary at which VWAP accumulation restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VwapAnchor {
    /// UTC calendar day
    #[default]
    Daily,
    /// ISO week (Monday start, UTC)
    Weekly,
    /// Accumulate over the whole table
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Day(NaiveDate),
    Week(i32, u32),
    All,
    Unknown,
}

impl VwapAnchor {
    fn session(self, timestamp_ms: i64) -> Session {
        if self == VwapAnchor::Never {
            return Session::All;
        }
        let Some(dt) = DateTime::from_timestamp_millis(timestamp_ms) else {
            return Session::Unknown;
        };
        let date = dt.date_naive();
        match self {
            VwapAnchor::Daily => Session::Day(date),
            VwapAnchor::Weekly => {
                let week = date.iso_week();
                Session::Week(week.year(), week.week())
            }
            VwapAnchor::Never => Session::All,
        }
    }
}

/// Anchored Volume Weighted Average Price.
///
/// `Σ(typical · volume) / Σ volume` accumulated since the last anchor
/// boundary. Positions with zero cumulative volume are undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vwap {
    anchor: VwapAnchor,
}

impl Vwap {
    pub fn new(anchor: VwapAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> VwapAnchor {
        self.anchor
    }
}

impl CandleIndicator for Vwap {
    fn calculate(&self, table: &CandleTable) -> Series {
        let mut session: Option<Session> = None;
        let mut pv = 0.0;
        let mut vol = 0.0;

        table
            .candles()
            .map(|candle| {
                let current = self.anchor.session(candle.timestamp);
                if session != Some(current) {
                    session = Some(current);
                    pv = 0.0;
                    vol = 0.0;
                }
                let typical = candle.typical_price();
                if typical.is_finite() && candle.volume.is_finite() {
                    pv += typical * candle.volume;
                    vol += candle.volume;
                }
                if vol == 0.0 {
                    f64::NAN
                } else {
                    pv / vol
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "VWAP"
    }
}

/// Classifies the trend of the candle bodies relative to VWAP.
///
/// For `i >= backcandles`, with `j` ranging over `[i - backcandles, i]`:
/// - `2.0` when every body is strictly above VWAP (`min(open, close) > vwap`)
/// - `1.0` when every body is strictly below VWAP (`max(open, close) < vwap`)
/// - `0.0` otherwise, and for the first `backcandles` positions.
///
/// An undefined VWAP violates both conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VwapTrend {
    backcandles: usize,
    anchor: VwapAnchor,
}

/// Classifier codes.
pub const TREND_MIXED: f64 = 0.0;
pub const TREND_BELOW: f64 = 1.0;
pub const TREND_ABOVE: f64 = 2.0;

impl VwapTrend {
    pub fn new(backcandles: usize) -> Result<Self, IndicatorError> {
        Self::with_anchor(backcandles, VwapAnchor::Daily)
    }

    pub fn with_anchor(backcandles: usize, anchor: VwapAnchor) -> Result<Self, IndicatorError> {
        if backcandles == 0 {
            return Err(IndicatorError::InvalidParameter(
                "VWAP trend backcandles must be at least 1".into(),
            ));
        }
        Ok(Self { backcandles, anchor })
    }

    pub fn backcandles(&self) -> usize {
        self.backcandles
    }

    /// Classify against an existing VWAP series in one pass.
    pub fn classify(&self, open: &Series, close: &Series, vwap: &Series) -> Result<Series, IndicatorError> {
        for other in [close, vwap] {
            if other.len() != open.len() {
                return Err(IndicatorError::Alignment {
                    left: open.len(),
                    right: other.len(),
                });
            }
        }

        let n = open.len();
        let violations = |j: usize| -> (bool, bool) {
            match (open.get(j), close.get(j), vwap.get(j)) {
                (Some(o), Some(c), Some(v)) => (o.min(c) <= v, o.max(c) >= v),
                _ => (true, true),
            }
        };

        let window = self.backcandles + 1;
        let mut out = vec![TREND_MIXED; n];
        let mut above_violations = 0usize;
        let mut below_violations = 0usize;

        for i in 0..n {
            let (above, below) = violations(i);
            above_violations += above as usize;
            below_violations += below as usize;
            if i >= window {
                let (above, below) = violations(i - window);
                above_violations -= above as usize;
                below_violations -= below as usize;
            }
            if i >= self.backcandles {
                out[i] = if above_violations == 0 {
                    TREND_ABOVE
                } else if below_violations == 0 {
                    TREND_BELOW
                } else {
                    TREND_MIXED
                };
            }
        }
        Ok(Series::new(out))
    }
}

impl CandleIndicator for VwapTrend {
    fn calculate(&self, table: &CandleTable) -> Series {
        let vwap = Vwap::new(self.anchor).calculate(table);
        self.classify(table.open(), table.close(), &vwap)
            .unwrap_or_else(|_| Series::undefined(table.len()))
    }

    fn period(&self) -> usize {
        self.backcandles + 1
    }

    fn name(&self) -> &str {
        "VWAP_TREND"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::{Candle, Timeframe};

    const HOUR: i64 = 3_600_000;

    fn table(candles: Vec<Candle>) -> CandleTable {
        CandleTable::new("X/Y", Timeframe::Hour1, candles).unwrap()
    }

    #[test]
    fn test_typical_price() {
        let t = table(vec![Candle::new(0, 1.0, 12.0, 6.0, 9.0, 1.0)]);
        assert_eq!(typical_price(&t).get(0), Some(9.0));
    }

    #[test]
    fn test_vwap_resets_daily() {
        // 22:00, 23:00 on day 0, then 00:00 on day 1
        let t = table(vec![
            Candle::new(22 * HOUR, 10.0, 10.0, 10.0, 10.0, 1.0),
            Candle::new(23 * HOUR, 20.0, 20.0, 20.0, 20.0, 3.0),
            Candle::new(24 * HOUR, 30.0, 30.0, 30.0, 30.0, 2.0),
        ]);

        let daily = Vwap::new(VwapAnchor::Daily).calculate(&t);
        assert_eq!(daily.get(0), Some(10.0));
        assert!((daily.get(1).unwrap() - 17.5).abs() < 1e-10);
        assert_eq!(daily.get(2), Some(30.0));

        let never = Vwap::new(VwapAnchor::Never).calculate(&t);
        assert!((never.get(2).unwrap() - 130.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_vwap_zero_volume_undefined() {
        let t = table(vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 0.0),
            Candle::new(HOUR, 12.0, 12.0, 12.0, 12.0, 1.0),
        ]);
        let vwap = Vwap::default().calculate(&t);
        assert_eq!(vwap.get(0), None);
        assert_eq!(vwap.get(1), Some(12.0));
    }

    #[test]
    fn test_vwap_weekly_boundary() {
        // 1970-01-04 is a Sunday, 1970-01-05 a Monday
        let sunday = 3 * 24 * HOUR;
        let monday = 4 * 24 * HOUR;
        let t = table(vec![
            Candle::new(sunday, 10.0, 10.0, 10.0, 10.0, 1.0),
            Candle::new(monday, 20.0, 20.0, 20.0, 20.0, 1.0),
        ]);
        let vwap = Vwap::new(VwapAnchor::Weekly).calculate(&t);
        assert_eq!(vwap.get(1), Some(20.0));
    }

    #[test]
    fn test_trend_rejects_zero_backcandles() {
        assert!(VwapTrend::new(0).is_err());
    }

    #[test]
    fn test_trend_codes() {
        let open = Series::new(vec![11.0, 11.0, 11.0, 9.0, 9.0, 9.0]);
        let close = Series::new(vec![12.0, 12.0, 12.0, 8.0, 8.0, 8.0]);
        let vwap = Series::constant(6, 10.0);

        let trend = VwapTrend::new(2).unwrap().classify(&open, &close, &vwap).unwrap();
        assert_eq!(trend.values(), &[0.0, 0.0, 2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_trend_undefined_vwap_violates_both() {
        let open = Series::constant(4, 11.0);
        let close = Series::constant(4, 12.0);
        let vwap = Series::new(vec![10.0, f64::NAN, 10.0, 10.0]);

        let trend = VwapTrend::new(1).unwrap().classify(&open, &close, &vwap).unwrap();
        assert_eq!(trend.values(), &[0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_trend_touching_vwap_is_mixed() {
        let open = Series::constant(3, 10.0);
        let close = Series::constant(3, 12.0);
        let vwap = Series::constant(3, 10.0);

        let trend = VwapTrend::new(1).unwrap().classify(&open, &close, &vwap).unwrap();
        assert_eq!(trend.get(2), Some(0.0));
    }
}

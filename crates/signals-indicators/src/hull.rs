//! Hull moving average family.
//!
//! All derived windows are floored: `W/2`, `W/3` and `⌊√W⌋`. A derived
//! window of zero is rejected at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use signals_core::{Indicator, IndicatorError, Series};

use crate::moving_average::{Ema, Wma};

/// Integer square root, rounded down.
pub(crate) fn isqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

fn derived(name: &str, period: usize, window: usize, what: &str) -> Result<usize, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{name}({period}): derived window {what} is zero"
        )));
    }
    Ok(window)
}

fn combine(a: &Series, b: &Series, f: impl Fn(f64, f64) -> f64) -> Series {
    a.zip_with(b, f)
        .unwrap_or_else(|_| Series::undefined(a.len()))
}

/// Hull Moving Average: `WMA(2·WMA(x, W/2) − WMA(x, W), √W)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hma {
    period: usize,
    half: Wma,
    full: Wma,
    smooth: Wma,
}

impl Hma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let half = derived("HMA", period, period / 2, "W/2")?;
        let root = derived("HMA", period, isqrt(period), "sqrt(W)")?;
        Ok(Self {
            period,
            half: Wma::new(half)?,
            full: Wma::new(period)?,
            smooth: Wma::new(root)?,
        })
    }
}

impl Indicator for Hma {
    fn calculate(&self, input: &Series) -> Series {
        let half = self.half.calculate(input);
        let full = self.full.calculate(input);
        let raw = combine(&half, &full, |h, f| 2.0 * h - f);
        self.smooth.calculate(&raw)
    }

    fn period(&self) -> usize {
        self.period + isqrt(self.period) - 1
    }

    fn name(&self) -> &str {
        "HMA"
    }
}

/// Triple Hull Moving Average:
/// `WMA(3·WMA(x, W/3) − WMA(x, W/2) − WMA(x, W), W)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thma {
    period: usize,
    third: Wma,
    half: Wma,
    full: Wma,
}

impl Thma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let third = derived("THMA", period, period / 3, "W/3")?;
        let half = derived("THMA", period, period / 2, "W/2")?;
        Ok(Self {
            period,
            third: Wma::new(third)?,
            half: Wma::new(half)?,
            full: Wma::new(period)?,
        })
    }
}

impl Indicator for Thma {
    fn calculate(&self, input: &Series) -> Series {
        let third = self.third.calculate(input);
        let half = self.half.calculate(input);
        let full = self.full.calculate(input);
        let partial = combine(&third, &half, |t, h| 3.0 * t - h);
        let raw = combine(&partial, &full, |p, f| p - f);
        self.full.calculate(&raw)
    }

    fn period(&self) -> usize {
        2 * self.period - 1
    }

    fn name(&self) -> &str {
        "THMA"
    }
}

/// Exponential Hull Moving Average: `EMA(2·EMA(x, W/2) − EMA(x, W), √W)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ehma {
    period: usize,
    half: Ema,
    full: Ema,
    smooth: Ema,
}

impl Ehma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let half = derived("EHMA", period, period / 2, "W/2")?;
        let root = derived("EHMA", period, isqrt(period), "sqrt(W)")?;
        Ok(Self {
            period,
            half: Ema::new(half)?,
            full: Ema::new(period)?,
            smooth: Ema::new(root)?,
        })
    }
}

impl Indicator for Ehma {
    fn calculate(&self, input: &Series) -> Series {
        let half = self.half.calculate(input);
        let full = self.full.calculate(input);
        let raw = combine(&half, &full, |h, f| 2.0 * h - f);
        self.smooth.calculate(&raw)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EHMA"
    }
}

/// Selector for one member of the Hull family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HullVariant {
    Hma,
    Thma,
    #[default]
    Ehma,
}

impl HullVariant {
    /// Build the indicator for `period`.
    pub fn build(self, period: usize) -> Result<Box<dyn Indicator>, IndicatorError> {
        Ok(match self {
            HullVariant::Hma => Box::new(Hma::new(period)?),
            HullVariant::Thma => Box::new(Thma::new(period)?),
            HullVariant::Ehma => Box::new(Ehma::new(period)?),
        })
    }

    /// Column name used by strategies, e.g. `hma_75`.
    pub fn column_name(self, period: usize) -> String {
        format!("{self}_{period}")
    }

    pub fn all() -> [HullVariant; 3] {
        [HullVariant::Hma, HullVariant::Thma, HullVariant::Ehma]
    }
}

impl fmt::Display for HullVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HullVariant::Hma => "hma",
            HullVariant::Thma => "thma",
            HullVariant::Ehma => "ehma",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HullVariant {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hma" => Ok(HullVariant::Hma),
            "thma" => Ok(HullVariant::Thma),
            "ehma" => Ok(HullVariant::Ehma),
            other => Err(IndicatorError::InvalidParameter(format!(
                "unknown hull variant '{other}' (expected hma, thma or ehma)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Series {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(27), 5);
        assert_eq!(isqrt(55), 7);
        assert_eq!(isqrt(64), 8);
    }

    #[test]
    fn test_minimum_periods() {
        assert!(Hma::new(1).is_err());
        assert!(Hma::new(2).is_ok());
        assert!(Thma::new(2).is_err());
        assert!(Thma::new(3).is_ok());
        assert!(Ehma::new(1).is_err());
    }

    #[test]
    fn test_hma_first_defined_index() {
        // W-1 for the inner WMA plus sqrt(W)-1 for the outer one
        let hma = Hma::new(27).unwrap();
        let result = hma.calculate(&ramp(100));
        assert_eq!(result.first_defined(), Some(26 + 5 - 1));
    }

    #[test]
    fn test_hull_tracks_linear_trend() {
        // On a straight line the Hull family removes the lag of a plain WMA.
        let input = ramp(200);
        for variant in [HullVariant::Hma, HullVariant::Ehma] {
            let out = variant.build(16).unwrap().calculate(&input);
            let last = out.last().unwrap();
            let wma_last = Wma::new(16).unwrap().calculate(&input).last().unwrap();
            assert!(last > wma_last, "{variant} should lead the WMA");
        }
    }

    #[test]
    fn test_thma_first_defined_index() {
        let thma = Thma::new(9).unwrap();
        let result = thma.calculate(&ramp(40));
        assert_eq!(result.first_defined(), Some(2 * 9 - 2));
    }

    #[test]
    fn test_variant_parse_and_column() {
        assert_eq!("THMA".parse::<HullVariant>().unwrap(), HullVariant::Thma);
        assert!("sma".parse::<HullVariant>().is_err());
        assert_eq!(HullVariant::Ehma.column_name(75), "ehma_75");
    }
}

//! Moving average indicators.

use signals_core::{Indicator, IndicatorError, Reducer, Series};

use crate::{require_window, simd};

/// Simple Moving Average (SMA).
///
/// Arithmetic mean of the last N values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: require_window("SMA", period)?,
        })
    }
}

impl Indicator for Sma {
    fn calculate(&self, input: &Series) -> Series {
        input
            .rolling(self.period, Reducer::Mean)
            .unwrap_or_else(|_| Series::undefined(input.len()))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Weighted Moving Average (WMA).
///
/// Linear weights 1..N with the newest value weighted highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wma {
    period: usize,
}

impl Wma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: require_window("WMA", period)?,
        })
    }
}

impl Indicator for Wma {
    fn calculate(&self, input: &Series) -> Series {
        Series::new(simd::wma_simd(input.values(), self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "WMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// `α = 2 / (N + 1)`, seeded by the first defined input. Undefined inputs
/// produce undefined outputs and leave the running state untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let period = require_window("EMA", period)?;
        Ok(Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
        })
    }

    /// Caller guarantees `period > 0`.
    pub(crate) fn with_period(period: usize) -> Self {
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
        }
    }
}

impl Indicator for Ema {
    fn calculate(&self, input: &Series) -> Series {
        let one_minus_mult = 1.0 - self.multiplier;
        let mut state: Option<f64> = None;

        input
            .iter()
            .map(|value| {
                let value = value?;
                let next = match state {
                    Some(prev) => value * self.multiplier + prev * one_minus_mult,
                    None => value,
                };
                state = Some(next);
                Some(next)
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        Series::new(values.to_vec())
    }

    #[test]
    fn test_sma_basic() {
        let sma = Sma::new(3).unwrap();
        let result = sma.calculate(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        assert_eq!(result.len(), 5);
        assert_eq!(result.first_defined(), Some(2));
        assert!((result.get(2).unwrap() - 2.0).abs() < 1e-10);
        assert!((result.get(4).unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(Sma::new(0).is_err());
        assert!(Wma::new(0).is_err());
        assert!(Ema::new(0).is_err());
    }

    #[test]
    fn test_ema_seeded_by_first_value() {
        let ema = Ema::new(3).unwrap();
        let result = ema.calculate(&series(&[2.0, 4.0, 6.0]));

        // α = 0.5
        assert!((result.get(0).unwrap() - 2.0).abs() < 1e-10);
        assert!((result.get(1).unwrap() - 3.0).abs() < 1e-10);
        assert!((result.get(2).unwrap() - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_ema_skips_undefined_without_advancing() {
        let ema = Ema::new(3).unwrap();
        let result = ema.calculate(&series(&[f64::NAN, 2.0, f64::NAN, 4.0]));

        assert_eq!(result.get(0), None);
        assert_eq!(result.get(1), Some(2.0));
        assert_eq!(result.get(2), None);
        assert!((result.get(3).unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_constant_input() {
        let ema = Ema::new(10).unwrap();
        let result = ema.calculate(&Series::constant(50, 42.0));
        assert!((result.last().unwrap() - 42.0).abs() < 1e-10);
    }

    #[test]
    fn test_wma_basic() {
        let wma = Wma::new(3).unwrap();
        let result = wma.calculate(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        // WMA = (1*1 + 2*2 + 3*3) / 6 = 14/6
        assert!((result.get(2).unwrap() - 14.0 / 6.0).abs() < 1e-10);
        assert_eq!(wma.name(), "WMA");
    }
}

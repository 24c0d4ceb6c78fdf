//! Numeric series primitive.
//!
//! A `Series` is an ordered sequence of `f64` values indexed by candle
//! position (0 = oldest). Positions without enough history, or produced by
//! a division by zero, are *undefined*; they are stored as NaN internally
//! and exposed as `None` through [`Series::get`].
//!
//! Undefined values are not errors. Every operation propagates them, and
//! every comparison against an undefined operand is `false`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::IndicatorError;
use crate::types::Mask;

/// Degrees-of-freedom convention for rolling standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdMode {
    /// Divide by `n - 1` (pandas default).
    #[default]
    Sample,
    /// Divide by `n`.
    Population,
}

impl StdMode {
    fn ddof(self) -> usize {
        match self {
            StdMode::Sample => 1,
            StdMode::Population => 0,
        }
    }
}

/// Reduction applied to each rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
    Min,
    Max,
    Std(StdMode),
}

/// Elementwise comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl Comparison {
    /// Apply the operator; undefined operands never compare true.
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> bool {
        if left.is_nan() || right.is_nan() {
            return false;
        }
        match self {
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
        }
    }

    /// The operator that gives the same answer with operands swapped.
    pub fn flipped(self) -> Self {
        match self {
            Comparison::Gt => Comparison::Lt,
            Comparison::Ge => Comparison::Le,
            Comparison::Lt => Comparison::Gt,
            Comparison::Le => Comparison::Ge,
            Comparison::Eq => Comparison::Eq,
            Comparison::Ne => Comparison::Ne,
        }
    }
}

/// Ordered numeric series with undefined positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    values: Vec<f64>,
}

/// Non-finite results (inf from x/0, NaN from 0/0) collapse to undefined.
#[inline]
fn normalize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

impl Series {
    /// Create a series from raw values. Non-finite values become undefined.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into_iter().map(normalize).collect(),
        }
    }

    /// A series of `len` undefined positions.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![f64::NAN; len],
        }
    }

    /// A series holding `value` at every position.
    pub fn constant(len: usize, value: f64) -> Self {
        Self {
            values: vec![normalize(value); len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when undefined or out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    #[inline]
    pub fn is_defined(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Raw values, with NaN marking undefined positions.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(|v| if v.is_nan() { None } else { Some(*v) })
    }

    /// Index of the first defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }

    /// Most recent value, `None` if the last position is undefined.
    pub fn last(&self) -> Option<f64> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Mark positions `0..count` undefined.
    pub fn clear_prefix(&mut self, count: usize) {
        let end = count.min(self.values.len());
        for value in &mut self.values[..end] {
            *value = f64::NAN;
        }
    }

    /// Lag by `periods`: the value at `i` is `self[i - periods]`.
    ///
    /// Fails with `InvalidParameter` for negative periods.
    pub fn shift(&self, periods: isize) -> Result<Series, IndicatorError> {
        let periods = usize::try_from(periods).map_err(|_| {
            IndicatorError::InvalidParameter(format!("shift periods must be >= 0, got {periods}"))
        })?;
        Ok(self.lag(periods))
    }

    /// Non-negative lag; positions `i < periods` are undefined.
    pub fn lag(&self, periods: usize) -> Series {
        let n = self.len();
        let mut values = vec![f64::NAN; n];
        if periods < n {
            values[periods..].copy_from_slice(&self.values[..n - periods]);
        }
        Series { values }
    }

    /// Rolling reduction over a trailing window.
    ///
    /// The value at `i` reduces `self[i - window + 1 ..= i]`; positions
    /// before `window - 1`, and windows containing undefined values, are
    /// undefined.
    pub fn rolling(&self, window: usize, reducer: Reducer) -> Result<Series, IndicatorError> {
        if window == 0 {
            return Err(IndicatorError::InvalidParameter(
                "rolling window must be at least 1".into(),
            ));
        }

        let n = self.len();
        let mut out = vec![f64::NAN; n];
        if n < window {
            return Ok(Series { values: out });
        }

        match reducer {
            Reducer::Mean | Reducer::Sum => {
                let mut sum = 0.0;
                let mut missing = 0usize;
                for i in 0..n {
                    let incoming = self.values[i];
                    if incoming.is_nan() {
                        missing += 1;
                    } else {
                        sum += incoming;
                    }
                    if i >= window {
                        let outgoing = self.values[i - window];
                        if outgoing.is_nan() {
                            missing -= 1;
                        } else {
                            sum -= outgoing;
                        }
                    }
                    if i + 1 >= window && missing == 0 {
                        out[i] = match reducer {
                            Reducer::Mean => sum / window as f64,
                            _ => sum,
                        };
                    }
                }
            }
            Reducer::Min | Reducer::Max | Reducer::Std(_) => {
                for (offset, win) in self.values.windows(window).enumerate() {
                    if win.iter().any(|v| v.is_nan()) {
                        continue;
                    }
                    out[offset + window - 1] = reduce_window(win, reducer);
                }
            }
        }

        Ok(Series::new(out))
    }

    /// Apply `f` to every defined value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Series {
        Series {
            values: self
                .values
                .iter()
                .map(|&v| if v.is_nan() { v } else { normalize(f(v)) })
                .collect(),
        }
    }

    /// Combine two equally long series position by position.
    pub fn zip_with(
        &self,
        other: &Series,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Series, IndicatorError> {
        self.check_aligned(other)?;
        Ok(Series {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| {
                    if a.is_nan() || b.is_nan() {
                        f64::NAN
                    } else {
                        normalize(f(a, b))
                    }
                })
                .collect(),
        })
    }

    pub fn try_add(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Division by zero yields undefined.
    pub fn try_div(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Elementwise maximum of two series.
    pub fn max_with(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, f64::max)
    }

    /// Elementwise minimum of two series.
    pub fn min_with(&self, other: &Series) -> Result<Series, IndicatorError> {
        self.zip_with(other, f64::min)
    }

    pub fn abs(&self) -> Series {
        self.map(f64::abs)
    }

    /// `self[i] - self[i - periods]`.
    pub fn diff(&self, periods: usize) -> Series {
        let lagged = self.lag(periods);
        self.zip_with(&lagged, |a, b| a - b)
            .unwrap_or_else(|_| Series::undefined(self.len()))
    }

    /// Fractional change over `periods`.
    pub fn pct_change(&self, periods: usize) -> Series {
        let lagged = self.lag(periods);
        self.zip_with(&lagged, |a, b| a / b - 1.0)
            .unwrap_or_else(|_| Series::undefined(self.len()))
    }

    /// Running sum. Undefined positions stay undefined and add nothing.
    pub fn cumsum(&self) -> Series {
        let mut total = 0.0;
        let values = self
            .values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    return v;
                }
                total += v;
                total
            })
            .collect();
        Series { values }
    }

    /// Compare against another series; undefined operands compare false.
    pub fn compare(&self, op: Comparison, other: &Series) -> Result<Mask, IndicatorError> {
        self.check_aligned(other)?;
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| op.apply(a, b))
            .collect())
    }

    /// Compare against a scalar; undefined positions compare false.
    pub fn compare_scalar(&self, op: Comparison, value: f64) -> Mask {
        self.values.iter().map(|&a| op.apply(a, value)).collect()
    }

    pub fn gt(&self, other: &Series) -> Result<Mask, IndicatorError> {
        self.compare(Comparison::Gt, other)
    }

    pub fn lt(&self, other: &Series) -> Result<Mask, IndicatorError> {
        self.compare(Comparison::Lt, other)
    }

    /// True at `i` iff `self[i] > other[i]` and `self[i-1] <= other[i-1]`.
    pub fn cross_above(&self, other: &Series) -> Result<Mask, IndicatorError> {
        self.crossing(other, Comparison::Gt, Comparison::Le)
    }

    /// True at `i` iff `self[i] < other[i]` and `self[i-1] >= other[i-1]`.
    pub fn cross_below(&self, other: &Series) -> Result<Mask, IndicatorError> {
        self.crossing(other, Comparison::Lt, Comparison::Ge)
    }

    fn crossing(
        &self,
        other: &Series,
        now: Comparison,
        before: Comparison,
    ) -> Result<Mask, IndicatorError> {
        self.check_aligned(other)?;
        let a = &self.values;
        let b = &other.values;
        Ok((0..a.len())
            .map(|i| i > 0 && now.apply(a[i], b[i]) && before.apply(a[i - 1], b[i - 1]))
            .collect())
    }

    fn check_aligned(&self, other: &Series) -> Result<(), IndicatorError> {
        if self.len() != other.len() {
            return Err(IndicatorError::Alignment {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }
}

fn reduce_window(win: &[f64], reducer: Reducer) -> f64 {
    match reducer {
        Reducer::Min => win.iter().copied().fold(f64::INFINITY, f64::min),
        Reducer::Max => win.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Reducer::Std(mode) => {
            let n = win.len();
            let ddof = mode.ddof();
            if n <= ddof {
                return f64::NAN;
            }
            let mean = win.iter().sum::<f64>() / n as f64;
            let ss: f64 = win.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - ddof) as f64).sqrt()
        }
        Reducer::Mean => win.iter().sum::<f64>() / win.len() as f64,
        Reducer::Sum => win.iter().sum(),
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::new(values)
    }
}

impl FromIterator<f64> for Series {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Series::new(iter.into_iter().collect())
    }
}

impl FromIterator<Option<f64>> for Series {
    fn from_iter<T: IntoIterator<Item = Option<f64>>>(iter: T) -> Self {
        Series::new(iter.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for &Series {
            type Output = Series;

            fn $method(self, rhs: f64) -> Series {
                self.map(|v| v $op rhs)
            }
        }

        impl $trait<f64> for Series {
            type Output = Series;

            fn $method(self, rhs: f64) -> Series {
                (&self).$method(rhs)
            }
        }
    };
}

scalar_op!(Add, add, +);
scalar_op!(Sub, sub, -);
scalar_op!(Mul, mul, *);
scalar_op!(Div, div, /);

impl Neg for &Series {
    type Output = Series;

    fn neg(self) -> Series {
        self.map(|v| -v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[f64]) -> Series {
        Series::new(values.to_vec())
    }

    #[test]
    fn test_shift() {
        let series = s(&[1.0, 2.0, 3.0, 4.0]);
        let shifted = series.shift(2).unwrap();

        assert_eq!(shifted.get(0), None);
        assert_eq!(shifted.get(1), None);
        assert_eq!(shifted.get(2), Some(1.0));
        assert_eq!(shifted.get(3), Some(2.0));
    }

    #[test]
    fn test_shift_negative_rejected() {
        let series = s(&[1.0, 2.0]);
        assert!(matches!(
            series.shift(-1),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_shift_longer_than_series() {
        let shifted = s(&[1.0, 2.0]).lag(5);
        assert_eq!(shifted.defined_count(), 0);
        assert_eq!(shifted.len(), 2);
    }

    #[test]
    fn test_rolling_mean() {
        let series = s(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mean = series.rolling(3, Reducer::Mean).unwrap();

        assert_eq!(mean.get(0), None);
        assert_eq!(mean.get(1), None);
        assert!((mean.get(2).unwrap() - 2.0).abs() < 1e-10);
        assert!((mean.get(3).unwrap() - 3.0).abs() < 1e-10);
        assert!((mean.get(4).unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_window_zero_rejected() {
        let series = s(&[1.0, 2.0]);
        assert!(series.rolling(0, Reducer::Sum).is_err());
    }

    #[test]
    fn test_rolling_skips_windows_with_undefined() {
        let series = s(&[f64::NAN, 1.0, 2.0, 3.0]);
        let sum = series.rolling(2, Reducer::Sum).unwrap();

        assert_eq!(sum.get(1), None);
        assert_eq!(sum.get(2), Some(3.0));
        assert_eq!(sum.get(3), Some(5.0));
    }

    #[test]
    fn test_rolling_min_max_std() {
        let series = s(&[2.0, 4.0, 6.0, 8.0, 10.0]);

        let min = series.rolling(3, Reducer::Min).unwrap();
        let max = series.rolling(3, Reducer::Max).unwrap();
        assert_eq!(min.get(4), Some(6.0));
        assert_eq!(max.get(4), Some(10.0));

        // [2, 4, 6]: mean 4, squared deviations sum to 8
        let pop = series.rolling(3, Reducer::Std(StdMode::Population)).unwrap();
        let sample = series.rolling(3, Reducer::Std(StdMode::Sample)).unwrap();
        assert!((pop.get(2).unwrap() - (8.0f64 / 3.0).sqrt()).abs() < 1e-10);
        assert!((sample.get(2).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        let series = Series::constant(6, 100.0);
        let std = series.rolling(4, Reducer::Std(StdMode::Sample)).unwrap();
        assert_eq!(std.get(5), Some(0.0));
    }

    #[test]
    fn test_division_by_zero_is_undefined() {
        let a = s(&[1.0, 0.0, 4.0]);
        let b = s(&[0.0, 0.0, 2.0]);
        let q = a.try_div(&b).unwrap();

        assert_eq!(q.get(0), None);
        assert_eq!(q.get(1), None);
        assert_eq!(q.get(2), Some(2.0));
    }

    #[test]
    fn test_length_mismatch() {
        let a = s(&[1.0, 2.0]);
        let b = s(&[1.0]);
        assert_eq!(
            a.try_add(&b).unwrap_err(),
            IndicatorError::Alignment { left: 2, right: 1 }
        );
    }

    #[test]
    fn test_scalar_ops() {
        let series = s(&[1.0, f64::NAN, 3.0]);
        let out = &series * 2.0 - 1.0;

        assert_eq!(out.get(0), Some(1.0));
        assert_eq!(out.get(1), None);
        assert_eq!(out.get(2), Some(5.0));
    }

    #[test]
    fn test_cross_above() {
        let a = s(&[1.0, 2.0, 3.0, 3.0, 2.0, 4.0]);
        let b = s(&[2.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
        let crossed = a.cross_above(&b).unwrap();

        assert_eq!(crossed.positions(), vec![2, 5]);
    }

    #[test]
    fn test_cross_above_undefined_is_false() {
        let a = s(&[f64::NAN, 3.0, 1.0, 3.0]);
        let b = s(&[2.0, 2.0, f64::NAN, 2.0]);
        let crossed = a.cross_above(&b).unwrap();

        assert_eq!(crossed.count(), 0);
    }

    #[test]
    fn test_cross_below() {
        let a = s(&[3.0, 2.0, 1.0, 1.0]);
        let b = s(&[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(a.cross_below(&b).unwrap().positions(), vec![2]);
    }

    #[test]
    fn test_compare_undefined_false() {
        let a = s(&[f64::NAN, 1.0]);
        let mask = a.compare_scalar(Comparison::Ne, 0.0);
        assert!(!mask.get(0));
        assert!(mask.get(1));
    }

    #[test]
    fn test_diff_and_pct_change() {
        let series = s(&[100.0, 110.0, 99.0]);

        let diff = series.diff(1);
        assert_eq!(diff.get(0), None);
        assert_eq!(diff.get(1), Some(10.0));

        let pct = series.pct_change(1);
        assert!((pct.get(1).unwrap() - 0.1).abs() < 1e-12);
        assert!((pct.get(2).unwrap() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_cumsum_skips_undefined() {
        let total = s(&[1.0, f64::NAN, 2.0, 3.0]).cumsum();
        assert_eq!(total.get(0), Some(1.0));
        assert_eq!(total.get(1), None);
        assert_eq!(total.get(3), Some(6.0));
    }
}

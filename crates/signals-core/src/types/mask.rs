//! Boolean masks produced by comparisons and signal rules.

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::types::Series;

/// Ordered boolean sequence, one entry per candle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mask {
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All-true mask of `len` positions.
    pub fn all_true(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    /// All-false mask of `len` positions.
    pub fn all_false(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value at `index`; out-of-range positions are false.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Indices of the true positions.
    pub fn iter_true(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    pub fn positions(&self) -> Vec<usize> {
        self.iter_true().collect()
    }

    /// Number of true positions.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn any(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub fn and(&self, other: &Mask) -> Result<Mask, IndicatorError> {
        self.combine(other, |a, b| a && b)
    }

    pub fn or(&self, other: &Mask) -> Result<Mask, IndicatorError> {
        self.combine(other, |a, b| a || b)
    }

    pub fn not(&self) -> Mask {
        self.bits.iter().map(|&b| !b).collect()
    }

    /// Positions where the mask switches from false to true.
    ///
    /// Position 0 counts as an edge when it is true.
    pub fn rising_edges(&self) -> Vec<usize> {
        (0..self.bits.len())
            .filter(|&i| self.bits[i] && (i == 0 || !self.bits[i - 1]))
            .collect()
    }

    /// Force positions `0..count` to false.
    pub fn clear_prefix(&mut self, count: usize) {
        let end = count.min(self.bits.len());
        for bit in &mut self.bits[..end] {
            *bit = false;
        }
    }

    /// Encode as a 1.0 / 0.0 column.
    pub fn to_series(&self) -> Series {
        self.bits
            .iter()
            .map(|&b| if b { 1.0 } else { 0.0 })
            .collect()
    }

    fn combine(&self, other: &Mask, f: impl Fn(bool, bool) -> bool) -> Result<Mask, IndicatorError> {
        if self.len() != other.len() {
            return Err(IndicatorError::Alignment {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(self
            .bits
            .iter()
            .zip(&other.bits)
            .map(|(&a, &b)| f(a, b))
            .collect())
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<bool>> for Mask {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

//! SIMD kernels for windowed indicators.
//!
//! These use the `wide` crate for portable SIMD. Inputs may contain NaN
//! (undefined positions); the kernels leave NaN handling to the caller
//! except [`wma_simd`], which marks any window holding NaN undefined.

use wide::f64x4;

/// Dot product over the shorter of the two slices.
pub fn dot_product_simd(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let chunks = len / 4;
    let mut simd_sum = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let va = f64x4::new([a[idx], a[idx + 1], a[idx + 2], a[idx + 3]]);
        let vb = f64x4::new([b[idx], b[idx + 1], b[idx + 2], b[idx + 3]]);
        simd_sum += va * vb;
    }

    let mut result = simd_sum.reduce_add();
    for i in (chunks * 4)..len {
        result += a[i] * b[i];
    }
    result
}

/// Linear weights `1..=period`, oldest first.
pub fn linear_weights(period: usize) -> Vec<f64> {
    (1..=period).map(|w| w as f64).collect()
}

/// Weighted moving average with linear weights, newest weighted highest.
///
/// Output has the input's length. Positions before `period - 1`, and
/// windows containing NaN, are NaN.
pub fn wma_simd(data: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return out;
    }

    let weights = linear_weights(period);
    let denominator = (period * (period + 1)) as f64 / 2.0;

    // Index of the most recent NaN seen so far.
    let mut last_nan: Option<usize> = None;
    for i in 0..data.len() {
        if data[i].is_nan() {
            last_nan = Some(i);
        }
        if i + 1 < period {
            continue;
        }
        let start = i + 1 - period;
        if matches!(last_nan, Some(n) if n >= start) {
            continue;
        }
        out[i] = dot_product_simd(&data[start..=i], &weights) / denominator;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product_simd() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![5.0, 6.0, 7.0, 8.0, 9.0];
        // 5 + 12 + 21 + 32 + 45
        assert!((dot_product_simd(&a, &b) - 115.0).abs() < 1e-10);
    }

    #[test]
    fn test_wma_simd() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = wma_simd(&data, 3);

        assert!(result[0].is_nan() && result[1].is_nan());
        // (1*1 + 2*2 + 3*3) / 6
        assert!((result[2] - 14.0 / 6.0).abs() < 1e-10);
        assert!((result[4] - 26.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_wma_simd_skips_nan_windows() {
        let data = vec![f64::NAN, 1.0, 1.0, 1.0, f64::NAN, 1.0, 1.0];
        let result = wma_simd(&data, 2);

        assert!(result[1].is_nan());
        assert!((result[2] - 1.0).abs() < 1e-12);
        assert!(result[4].is_nan() && result[5].is_nan());
        assert!((result[6] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_data() {
        assert!(wma_simd(&[], 5).is_empty());
        assert_eq!(dot_product_simd(&[], &[1.0]), 0.0);
    }
}

//! Volatility indicators.

use serde::{Deserialize, Serialize};
use signals_core::{CandleIndicator, CandleTable, IndicatorError, MultiOutputIndicator, Reducer, Series, StdMode};

use crate::require_window;

/// True range: `max(h - l, |h - prev_close|, |l - prev_close|)`.
///
/// Undefined at position 0, which has no previous close.
pub fn true_range(table: &CandleTable) -> Series {
    let high = table.high().values();
    let low = table.low().values();
    let close = table.close().values();

    (0..table.len())
        .map(|i| {
            if i == 0 {
                return f64::NAN;
            }
            let pc = close[i - 1];
            let hl = high[i] - low[i];
            let hc = (high[i] - pc).abs();
            let lc = (low[i] - pc).abs();
            if hl.is_nan() || hc.is_nan() || lc.is_nan() {
                f64::NAN
            } else {
                hl.max(hc).max(lc)
            }
        })
        .collect()
}

/// Smoothing applied to the true range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtrSmoothing {
    /// Rolling arithmetic mean
    #[default]
    Mean,
    /// Wilder's running average seeded by the first mean
    Wilder,
}

/// Average True Range (ATR).
///
/// The first `period` positions are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atr {
    period: usize,
    smoothing: AtrSmoothing,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_smoothing(period, AtrSmoothing::Mean)
    }

    pub fn with_smoothing(period: usize, smoothing: AtrSmoothing) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: require_window("ATR", period)?,
            smoothing,
        })
    }

    pub fn smoothing(&self) -> AtrSmoothing {
        self.smoothing
    }

    fn wilder(&self, tr: &Series) -> Series {
        let period = self.period as f64;
        let mut out = vec![f64::NAN; tr.len()];
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut atr: Option<f64> = None;

        for (i, value) in tr.iter().enumerate() {
            let Some(value) = value else { continue };
            atr = match atr {
                Some(prev) => Some((prev * (period - 1.0) + value) / period),
                None => {
                    count += 1;
                    sum += value;
                    (count == self.period).then(|| sum / period)
                }
            };
            if let Some(v) = atr {
                out[i] = v;
            }
        }
        Series::new(out)
    }
}

impl CandleIndicator for Atr {
    fn calculate(&self, table: &CandleTable) -> Series {
        let tr = true_range(table);
        match self.smoothing {
            AtrSmoothing::Mean => tr
                .rolling(self.period, Reducer::Mean)
                .unwrap_or_else(|_| Series::undefined(table.len())),
            AtrSmoothing::Wilder => self.wilder(&tr),
        }
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

impl BollingerOutput {
    /// `(upper - lower) / middle`
    pub fn width(&self) -> Series {
        self.upper
            .try_sub(&self.lower)
            .and_then(|spread| spread.try_div(&self.middle))
            .unwrap_or_else(|_| Series::undefined(self.middle.len()))
    }
}

/// Bollinger Bands: rolling mean ± k rolling standard deviations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bollinger {
    period: usize,
    std_dev: f64,
    mode: StdMode,
}

impl Bollinger {
    /// Bands with sample standard deviation.
    pub fn new(period: usize, std_dev: f64) -> Result<Self, IndicatorError> {
        Self::with_mode(period, std_dev, StdMode::Sample)
    }

    pub fn with_mode(period: usize, std_dev: f64, mode: StdMode) -> Result<Self, IndicatorError> {
        let period = require_window("Bollinger", period)?;
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "Bollinger std_dev multiplier must be finite and >= 0, got {std_dev}"
            )));
        }
        Ok(Self {
            period,
            std_dev,
            mode,
        })
    }
}

impl MultiOutputIndicator for Bollinger {
    type Outputs = BollingerOutput;

    fn calculate(&self, input: &Series) -> BollingerOutput {
        let n = input.len();
        let middle = input
            .rolling(self.period, Reducer::Mean)
            .unwrap_or_else(|_| Series::undefined(n));
        let band = input
            .rolling(self.period, Reducer::Std(self.mode))
            .unwrap_or_else(|_| Series::undefined(n))
            * self.std_dev;

        let upper = middle.try_add(&band).unwrap_or_else(|_| Series::undefined(n));
        let lower = middle.try_sub(&band).unwrap_or_else(|_| Series::undefined(n));
        BollingerOutput {
            upper,
            middle,
            lower,
        }
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "BB"
    }
}

//! Momentum indicators.

use signals_core::{CandleIndicator, CandleTable, Indicator, IndicatorError, MultiOutputIndicator, Series};

use crate::moving_average::Ema;
use crate::require_window;
use crate::volatility::true_range;

/// Running Wilder average: the first value is the plain mean of `period`
/// samples, later values are `(prev * (period - 1) + x) / period`.
#[derive(Debug, Clone)]
struct WilderAverage {
    period: f64,
    count: usize,
    sum: f64,
    value: Option<f64>,
}

impl WilderAverage {
    fn new(period: usize) -> Self {
        Self {
            period: period as f64,
            count: 0,
            sum: 0.0,
            value: None,
        }
    }

    fn update(&mut self, x: f64) -> Option<f64> {
        self.value = match self.value {
            Some(prev) => Some((prev * (self.period - 1.0) + x) / self.period),
            None => {
                self.count += 1;
                self.sum += x;
                (self.count as f64 >= self.period).then(|| self.sum / self.period)
            }
        };
        self.value
    }
}

/// Relative Strength Index (RSI).
///
/// Wilder-smoothed average gain over average loss, scaled to 0..100.
/// The first `period` positions are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 or 16.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: require_window("RSI", period)?,
        })
    }
}

impl Indicator for Rsi {
    fn calculate(&self, input: &Series) -> Series {
        let mut gains = WilderAverage::new(self.period);
        let mut losses = WilderAverage::new(self.period);
        let mut prev: Option<f64> = None;

        input
            .iter()
            .map(|value| {
                let value = value?;
                let last = prev.replace(value)?;
                let change = value - last;
                let gain = gains.update(change.max(0.0));
                let loss = losses.update((-change).max(0.0));
                match (gain, loss) {
                    // flat window
                    (Some(g), Some(l)) if g + l == 0.0 => Some(50.0),
                    (Some(g), Some(l)) => Some(100.0 * g / (g + l)),
                    _ => None,
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD output series.
#[derive(Debug, Clone)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: Series,
    /// Signal line (EMA of MACD)
    pub signal: Series,
    /// Histogram (MACD - Signal)
    pub histogram: Series,
}

/// MACD indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Standard MACD (12, 26, 9).
    pub fn standard() -> Self {
        Self {
            fast: Ema::with_period(12),
            slow: Ema::with_period(26),
            signal: Ema::with_period(9),
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }

    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        if fast >= slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD fast period ({fast}) must be less than slow period ({slow})"
            )));
        }
        Ok(Self {
            fast: Ema::new(fast)?,
            slow: Ema::new(slow)?,
            signal: Ema::new(signal)?,
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        })
    }

    pub fn periods(&self) -> (usize, usize, usize) {
        (self.fast_period, self.slow_period, self.signal_period)
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::standard()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, input: &Series) -> MacdOutput {
        let fast = self.fast.calculate(input);
        let slow = self.slow.calculate(input);
        let macd = fast
            .try_sub(&slow)
            .unwrap_or_else(|_| Series::undefined(input.len()));
        let signal = self.signal.calculate(&macd);
        let histogram = macd
            .try_sub(&signal)
            .unwrap_or_else(|_| Series::undefined(input.len()));
        MacdOutput {
            macd,
            signal,
            histogram,
        }
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// ADX output series.
#[derive(Debug, Clone)]
pub struct AdxOutput {
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
}

/// Average Directional Index (Wilder).
///
/// DI lines are defined from position `period`; ADX, the Wilder average of
/// DX, from position `2 * period - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adx {
    period: usize,
}

impl Adx {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: require_window("ADX", period)?,
        })
    }

    /// ADX together with the +DI and -DI lines.
    pub fn components(&self, table: &CandleTable) -> AdxOutput {
        let n = table.len();
        let high = table.high().values();
        let low = table.low().values();
        let tr = true_range(table);
        let period = self.period as f64;

        let mut adx = vec![f64::NAN; n];
        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];

        // Wilder running sums (not averages) for TR and the directional moves.
        let (mut s_tr, mut s_plus, mut s_minus) = (0.0, 0.0, 0.0);
        let mut dx_avg = WilderAverage::new(self.period);

        for i in 1..n {
            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
            let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
            let tr_i = tr.values()[i];
            if tr_i.is_nan() || plus_dm.is_nan() || minus_dm.is_nan() {
                continue;
            }

            if i <= self.period {
                s_tr += tr_i;
                s_plus += plus_dm;
                s_minus += minus_dm;
                if i < self.period {
                    continue;
                }
            } else {
                s_tr = s_tr - s_tr / period + tr_i;
                s_plus = s_plus - s_plus / period + plus_dm;
                s_minus = s_minus - s_minus / period + minus_dm;
            }

            if s_tr == 0.0 {
                continue;
            }
            let pdi = 100.0 * s_plus / s_tr;
            let mdi = 100.0 * s_minus / s_tr;
            plus_di[i] = pdi;
            minus_di[i] = mdi;

            let dx = if pdi + mdi == 0.0 {
                0.0
            } else {
                100.0 * (pdi - mdi).abs() / (pdi + mdi)
            };
            if let Some(value) = dx_avg.update(dx) {
                adx[i] = value;
            }
        }

        AdxOutput {
            adx: Series::new(adx),
            plus_di: Series::new(plus_di),
            minus_di: Series::new(minus_di),
        }
    }
}

impl CandleIndicator for Adx {
    fn calculate(&self, table: &CandleTable) -> Series {
        self.components(table).adx
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

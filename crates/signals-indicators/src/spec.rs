//! Declarative indicator descriptions.
//!
//! An [`IndicatorSpec`] names an indicator and its parameters as plain data
//! so strategies and configuration files can bind indicators to columns:
//!
//! ```toml
//! indicator = { kind = "bollinger", period = 20, std_dev = 2.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use signals_core::{
    CandleIndicator, CandleTable, IndicatorError, Indicator, MultiOutputIndicator, Series, StdMode,
};

use crate::hull::{isqrt, Ehma, Hma, Thma};
use crate::momentum::{Adx, Macd, Rsi};
use crate::moving_average::{Ema, Sma, Wma};
use crate::volatility::{Atr, AtrSmoothing, Bollinger};
use crate::volume::{TypicalPrice, Vwap, VwapAnchor, VwapTrend};

fn default_fast() -> usize {
    12
}

fn default_slow() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

fn default_std_dev() -> f64 {
    2.0
}

/// An indicator together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorSpec {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
    },
    Wma {
        period: usize,
    },
    Hma {
        period: usize,
    },
    Thma {
        period: usize,
    },
    Ehma {
        period: usize,
    },
    Macd {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default = "default_signal")]
        signal: usize,
    },
    Bollinger {
        period: usize,
        #[serde(default = "default_std_dev")]
        std_dev: f64,
        #[serde(default)]
        mode: StdMode,
    },
    Atr {
        period: usize,
        #[serde(default)]
        smoothing: AtrSmoothing,
    },
    Rsi {
        period: usize,
    },
    Adx {
        period: usize,
    },
    Vwap {
        #[serde(default)]
        anchor: VwapAnchor,
    },
    VwapTrend {
        backcandles: usize,
        #[serde(default)]
        anchor: VwapAnchor,
    },
    TypicalPrice,
}

/// Named output columns produced by one indicator binding.
#[derive(Debug, Clone, Default)]
pub struct IndicatorOutput {
    pub columns: Vec<(String, Series)>,
}

impl IndicatorOutput {
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

enum Built {
    Single(Box<dyn Indicator>),
    Candle(Box<dyn CandleIndicator>),
    Macd(Macd),
    Bollinger(Bollinger),
}

impl IndicatorSpec {
    pub fn sma(period: usize) -> Self {
        IndicatorSpec::Sma { period }
    }

    pub fn ema(period: usize) -> Self {
        IndicatorSpec::Ema { period }
    }

    pub fn rsi(period: usize) -> Self {
        IndicatorSpec::Rsi { period }
    }

    pub fn bollinger(period: usize, std_dev: f64) -> Self {
        IndicatorSpec::Bollinger {
            period,
            std_dev,
            mode: StdMode::Sample,
        }
    }

    pub fn macd() -> Self {
        IndicatorSpec::Macd {
            fast: default_fast(),
            slow: default_slow(),
            signal: default_signal(),
        }
    }

    /// Check the parameters without computing anything.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        self.build().map(|_| ())
    }

    /// Whether the indicator reads a single source column.
    ///
    /// Candle indicators (ATR, ADX, VWAP, typical price) read the candle
    /// fields directly and ignore the binding's source.
    pub fn uses_source(&self) -> bool {
        !matches!(
            self,
            IndicatorSpec::Atr { .. }
                | IndicatorSpec::Adx { .. }
                | IndicatorSpec::Vwap { .. }
                | IndicatorSpec::VwapTrend { .. }
                | IndicatorSpec::TypicalPrice
        )
    }

    /// Candles needed before the output is meaningful.
    pub fn lookback(&self) -> usize {
        match *self {
            IndicatorSpec::Sma { period }
            | IndicatorSpec::Ema { period }
            | IndicatorSpec::Wma { period }
            | IndicatorSpec::Ehma { period }
            | IndicatorSpec::Bollinger { period, .. } => period,
            IndicatorSpec::Hma { period } => (period + isqrt(period)).saturating_sub(1),
            IndicatorSpec::Thma { period } => (2 * period).saturating_sub(1),
            IndicatorSpec::Macd { slow, signal, .. } => slow + signal,
            IndicatorSpec::Atr { period, .. } | IndicatorSpec::Rsi { period } => period + 1,
            IndicatorSpec::Adx { period } => 2 * period,
            IndicatorSpec::VwapTrend { backcandles, .. } => backcandles + 1,
            IndicatorSpec::Vwap { .. } | IndicatorSpec::TypicalPrice => 1,
        }
    }

    /// Column names written for a binding called `name`.
    pub fn output_names(&self, name: &str) -> Vec<String> {
        match self {
            IndicatorSpec::Macd { .. } => {
                vec![name.to_string(), format!("{name}_signal"), format!("{name}_hist")]
            }
            IndicatorSpec::Bollinger { .. } => vec![
                format!("{name}_upper"),
                format!("{name}_mid"),
                format!("{name}_lower"),
            ],
            _ => vec![name.to_string()],
        }
    }

    fn build(&self) -> Result<Built, IndicatorError> {
        Ok(match *self {
            IndicatorSpec::Sma { period } => Built::Single(Box::new(Sma::new(period)?)),
            IndicatorSpec::Ema { period } => Built::Single(Box::new(Ema::new(period)?)),
            IndicatorSpec::Wma { period } => Built::Single(Box::new(Wma::new(period)?)),
            IndicatorSpec::Hma { period } => Built::Single(Box::new(Hma::new(period)?)),
            IndicatorSpec::Thma { period } => Built::Single(Box::new(Thma::new(period)?)),
            IndicatorSpec::Ehma { period } => Built::Single(Box::new(Ehma::new(period)?)),
            IndicatorSpec::Rsi { period } => Built::Single(Box::new(Rsi::new(period)?)),
            IndicatorSpec::Macd { fast, slow, signal } => {
                Built::Macd(Macd::with_periods(fast, slow, signal)?)
            }
            IndicatorSpec::Bollinger {
                period,
                std_dev,
                mode,
            } => Built::Bollinger(Bollinger::with_mode(period, std_dev, mode)?),
            IndicatorSpec::Atr { period, smoothing } => {
                Built::Candle(Box::new(Atr::with_smoothing(period, smoothing)?))
            }
            IndicatorSpec::Adx { period } => Built::Candle(Box::new(Adx::new(period)?)),
            IndicatorSpec::Vwap { anchor } => Built::Candle(Box::new(Vwap::new(anchor))),
            IndicatorSpec::VwapTrend {
                backcandles,
                anchor,
            } => Built::Candle(Box::new(VwapTrend::with_anchor(backcandles, anchor)?)),
            IndicatorSpec::TypicalPrice => Built::Candle(Box::new(TypicalPrice)),
        })
    }

    /// Compute the raw output series, in [`output_names`](Self::output_names) order.
    pub fn compute(&self, table: &CandleTable, source: &str) -> Result<Vec<Series>, IndicatorError> {
        let built = self.build()?;
        let input = || {
            table
                .column(source)
                .ok_or_else(|| IndicatorError::UnknownColumn(source.to_string()))
        };

        Ok(match built {
            Built::Single(indicator) => vec![indicator.calculate(input()?)],
            Built::Candle(indicator) => vec![indicator.calculate(table)],
            Built::Macd(macd) => {
                let out = macd.calculate(input()?);
                vec![out.macd, out.signal, out.histogram]
            }
            Built::Bollinger(bb) => {
                let out = bb.calculate(input()?);
                vec![out.upper, out.middle, out.lower]
            }
        })
    }

    /// Compute and name the outputs for a binding called `name`.
    pub fn compute_named(
        &self,
        table: &CandleTable,
        name: &str,
        source: &str,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let series = self.compute(table, source)?;
        Ok(IndicatorOutput {
            columns: self.output_names(name).into_iter().zip(series).collect(),
        })
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = |m: &StdMode| match m {
            StdMode::Sample => "sample",
            StdMode::Population => "population",
        };
        let anchor = |a: &VwapAnchor| match a {
            VwapAnchor::Daily => "daily",
            VwapAnchor::Weekly => "weekly",
            VwapAnchor::Never => "never",
        };
        match self {
            IndicatorSpec::Sma { period } => write!(f, "SMA({period})"),
            IndicatorSpec::Ema { period } => write!(f, "EMA({period})"),
            IndicatorSpec::Wma { period } => write!(f, "WMA({period})"),
            IndicatorSpec::Hma { period } => write!(f, "HMA({period})"),
            IndicatorSpec::Thma { period } => write!(f, "THMA({period})"),
            IndicatorSpec::Ehma { period } => write!(f, "EHMA({period})"),
            IndicatorSpec::Macd { fast, slow, signal } => write!(f, "MACD({fast},{slow},{signal})"),
            IndicatorSpec::Bollinger {
                period,
                std_dev,
                mode: m,
            } => write!(f, "BB({period},{std_dev},{})", mode(m)),
            IndicatorSpec::Atr { period, smoothing } => {
                let s = match smoothing {
                    AtrSmoothing::Mean => "mean",
                    AtrSmoothing::Wilder => "wilder",
                };
                write!(f, "ATR({period},{s})")
            }
            IndicatorSpec::Rsi { period } => write!(f, "RSI({period})"),
            IndicatorSpec::Adx { period } => write!(f, "ADX({period})"),
            IndicatorSpec::Vwap { anchor: a } => write!(f, "VWAP({})", anchor(a)),
            IndicatorSpec::VwapTrend {
                backcandles,
                anchor: a,
            } => write!(f, "VWAP_TREND({backcandles},{})", anchor(a)),
            IndicatorSpec::TypicalPrice => write!(f, "TYPPRICE"),
        }
    }
}

//! Windowed technical indicators over candle tables.
//!
//! This crate provides the indicator set used by the built-in strategies:
//! - Moving averages (SMA, WMA, EMA) and the Hull family (HMA, THMA, EHMA)
//! - Momentum indicators (RSI, MACD, ADX)
//! - Volatility indicators (ATR, Bollinger Bands)
//! - Volume indicators (anchored VWAP, VWAP trend classifier, typical price)
//!
//! Every output has the input's length; positions without enough history
//! are undefined. [`IndicatorSpec`] names an indicator declaratively and
//! [`IndicatorCache`] memoises computed columns per table.

pub mod cache;
pub mod hull;
pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod spec;
pub mod volatility;
pub mod volume;

pub use cache::IndicatorCache;
pub use hull::{Ehma, Hma, HullVariant, Thma};
pub use momentum::{Adx, AdxOutput, Macd, MacdOutput, Rsi};
pub use moving_average::{Ema, Sma, Wma};
pub use spec::{IndicatorOutput, IndicatorSpec};
pub use volatility::{true_range, Atr, AtrSmoothing, Bollinger, BollingerOutput};
pub use volume::{typical_price, TypicalPrice, Vwap, VwapAnchor, VwapTrend};

use signals_core::IndicatorError;

pub(crate) fn require_window(name: &str, window: usize) -> Result<usize, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{name} window must be at least 1"
        )));
    }
    Ok(window)
}

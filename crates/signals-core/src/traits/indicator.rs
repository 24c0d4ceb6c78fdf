//! Indicator trait definitions.

use crate::types::{CandleTable, Series};

/// Single-input, single-output indicator.
///
/// Parameters are validated when the indicator is constructed, so
/// calculation cannot fail. Positions without enough history are
/// undefined in the output, which always has the input's length.
pub trait Indicator: Send + Sync {
    /// Calculate indicator values for the given input series.
    fn calculate(&self, input: &Series) -> Series;

    /// Number of candles needed before the output is meaningful.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Indicator producing several related series (e.g. MACD, Bollinger Bands).
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple series.
    type Outputs;

    fn calculate(&self, input: &Series) -> Self::Outputs;

    fn period(&self) -> usize;

    fn name(&self) -> &str;
}

/// Indicator that reads several candle fields (high/low/close, volume,
/// timestamps) rather than a single input column.
pub trait CandleIndicator: Send + Sync {
    fn calculate(&self, table: &CandleTable) -> Series;

    fn period(&self) -> usize;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        fn calculate(&self, input: &Series) -> Series {
            input
                .rolling(self.period, crate::types::Reducer::Sum)
                .unwrap_or_else(|_| Series::undefined(input.len()))
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_indicator_calculate() {
        let indicator = TestIndicator { period: 3 };
        let data = Series::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = indicator.calculate(&data);

        assert_eq!(result.len(), 5);
        assert_eq!(result.get(1), None);
        assert!((result.get(2).unwrap() - 6.0).abs() < 0.001); // 1+2+3
        assert!((result.get(4).unwrap() - 12.0).abs() < 0.001); // 3+4+5
        assert_eq!(indicator.name(), "test");
    }
}

//! Core data types for the signal engine.

mod candle;
mod mask;
mod metadata;
mod rule;
mod series;
mod signal;
mod timeframe;

pub use candle::{Candle, CandleTable, RESERVED_COLUMNS};
pub use mask::Mask;
pub use metadata::{RoiTable, StrategyMetadata, TrailingStop};
pub use rule::{col, lit, ColumnRef, Condition, Operand, SignalRule};
pub use series::{Comparison, Reducer, Series, StdMode};
pub use signal::{SignalAction, Signals, ENTER_LONG, EXIT_LONG};
pub use timeframe::Timeframe;

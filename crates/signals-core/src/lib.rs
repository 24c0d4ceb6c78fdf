//! Core types and traits for the candle signal engine.
//!
//! This crate provides the foundational building blocks including:
//! - Candle data (Candle, CandleTable) and timeframes
//! - The `Series` primitive with lag, rolling reductions and crossovers
//! - Boolean masks and the signal rule AST
//! - Strategy metadata (ROI table, stoploss, startup length)
//! - Core traits for indicators and data providers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{DataError, IndicatorError, SignalsError, SignalsResult, StrategyError};
pub use types::*;
pub use traits::*;

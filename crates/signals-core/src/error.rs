//! Error types for the signal engine.

use thiserror::Error;

/// Top-level signal engine error.
#[derive(Error, Debug)]
pub enum SignalsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Rule references unknown column: {0}")]
    UnknownColumn(String),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Candle table and data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    /// Joined tables or columns do not line up.
    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Timestamps must be strictly increasing (violated at row {index})")]
    NotMonotonic { index: usize },

    #[error("Column '{0}' is a candle field and cannot be replaced")]
    ReservedColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No data available: {0}")]
    NoDataAvailable(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    /// A window/length parameter is non-positive or a categorical
    /// parameter is outside its domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Series length mismatch: {left} vs {right}")]
    Alignment { left: usize, right: usize },

    #[error("Input column not found: {0}")]
    UnknownColumn(String),
}

/// Result type alias for signal engine operations.
pub type SignalsResult<T> = Result<T, SignalsError>;

//! Core traits for the signal engine.

mod data_provider;
mod indicator;

pub use data_provider::{DataProvider, InformativePair, NoData};
pub use indicator::{CandleIndicator, Indicator, MultiOutputIndicator};

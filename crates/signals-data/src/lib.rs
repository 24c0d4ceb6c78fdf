//! Candle data sources and informative-pair alignment.

mod alignment;
mod csv_source;
mod store;

pub use alignment::{informative_column, merge_informative, merge_informative_with, MergeAlignment};
pub use csv_source::{write_csv, CsvCandleSource};
pub use store::CandleStore;

use signals_core::{CandleTable, DataError, Timeframe};
use std::path::Path;

/// Load a candle table from a CSV file.
pub fn load_csv(
    path: impl AsRef<Path>,
    pair: &str,
    timeframe: Timeframe,
) -> Result<CandleTable, DataError> {
    let source = CsvCandleSource::new(path)?;
    source.load(pair, timeframe)
}

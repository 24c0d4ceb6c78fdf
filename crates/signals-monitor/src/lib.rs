//! Logging setup and per-run signal reports.

mod logging;
mod report;

pub use logging::setup_logging;
pub use report::{SignalEvent, SignalReport};

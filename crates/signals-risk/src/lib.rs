//! Per-trade stoploss policies.
//!
//! The host asks for a stoploss per open trade; policies may remember a
//! value per trade in an injected [`StoplossStore`].

mod stop_loss;

pub use stop_loss::{MemoryStoplossStore, RatchetStoploss, StoplossQuery, StoplossStore};

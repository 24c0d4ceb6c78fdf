//! Strategy implementations.
//!
//! This crate provides the [`Strategy`] trait and the built-in strategies:
//! - Hull suite (HMA / THMA / EHMA slope with optional MACD confirmation)
//! - VWAP trend with Bollinger Bands and a ratcheting ATR stoploss
//! - ADX-filtered SMA crossover
//! - RH combined (BinHV45 or ClucMay, filtered by BTC trend)
//! - Declarative rule strategies loaded from TOML or JSON

mod adx_sma;
mod context;
mod hull_suite;
mod registry;
mod rh_combined;
mod rule_strategy;
mod traits;
mod vwap_bollinger;

pub use adx_sma::{AdxSmaConfig, AdxSmaStrategy};
pub use context::AnalysisContext;
pub use hull_suite::{HullSuiteConfig, HullSuiteStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rh_combined::{RhCombinedConfig, RhCombinedStrategy};
pub use rule_strategy::{IndicatorBinding, RuleStrategy, RuleStrategyDefinition};
pub use traits::{startup_candles, Strategy, StrategyConfig};
pub use vwap_bollinger::{VwapBollingerConfig, VwapBollingerStrategy};

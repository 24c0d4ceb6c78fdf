//! Stoploss management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signals_core::StrategyError;
use std::collections::HashMap;
use tracing::debug;

/// Host request for the stoploss of one open trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoplossQuery {
    pub pair: String,
    pub trade_id: u64,
    pub current_time: DateTime<Utc>,
    pub current_rate: f64,
    /// Current profit as a ratio (0.05 = 5%)
    pub current_profit: f64,
}

/// Per-trade memory of the last stoploss handed to the host.
pub trait StoplossStore {
    fn get(&self, trade_id: u64) -> Option<f64>;

    fn set(&mut self, trade_id: u64, value: f64);

    /// Forget a closed trade.
    fn remove(&mut self, trade_id: u64) -> Option<f64>;
}

/// In-memory [`StoplossStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStoplossStore {
    values: HashMap<u64, f64>,
}

impl MemoryStoplossStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StoplossStore for MemoryStoplossStore {
    fn get(&self, trade_id: u64) -> Option<f64> {
        self.values.get(&trade_id).copied()
    }

    fn set(&mut self, trade_id: u64, value: f64) {
        self.values.insert(trade_id, value);
    }

    fn remove(&mut self, trade_id: u64) -> Option<f64> {
        self.values.remove(&trade_id)
    }
}

/// Ratcheting stoploss.
///
/// The first answer for a trade is the ATR stop of the last analysed
/// candle. After that the stored value only moves up: once profit reaches
/// `min_profit`, `profit / profit_divisor` replaces the stored value when
/// it is higher. Without a stored value or a defined ATR stop the answer is
/// `None` and the host falls back to its default stoploss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatchetStoploss {
    pub min_profit: f64,
    pub profit_divisor: f64,
}

impl Default for RatchetStoploss {
    fn default() -> Self {
        Self {
            min_profit: 0.01,
            profit_divisor: 2.0,
        }
    }
}

impl RatchetStoploss {
    pub fn new(min_profit: f64, profit_divisor: f64) -> Result<Self, StrategyError> {
        if !(profit_divisor.is_finite() && profit_divisor > 0.0) {
            return Err(StrategyError::InvalidConfig(format!(
                "profit_divisor must be positive, got {profit_divisor}"
            )));
        }
        if !min_profit.is_finite() {
            return Err(StrategyError::InvalidConfig(format!(
                "min_profit must be finite, got {min_profit}"
            )));
        }
        Ok(Self {
            min_profit,
            profit_divisor,
        })
    }

    /// Stoploss for `query`, given the last candle's ATR stop.
    pub fn evaluate(
        &self,
        query: &StoplossQuery,
        atr_stop: Option<f64>,
        store: &mut dyn StoplossStore,
    ) -> Option<f64> {
        if let Some(stored) = store.get(query.trade_id) {
            let candidate = query.current_profit / self.profit_divisor;
            if query.current_profit >= self.min_profit && candidate > stored {
                debug!(
                    pair = %query.pair,
                    trade_id = query.trade_id,
                    previous = stored,
                    stoploss = candidate,
                    "Raising stoploss"
                );
                store.set(query.trade_id, candidate);
                return Some(candidate);
            }
            return Some(stored);
        }

        match atr_stop.filter(|v| v.is_finite()) {
            Some(stop) => {
                debug!(
                    pair = %query.pair,
                    trade_id = query.trade_id,
                    stoploss = stop,
                    "Initial stoploss from ATR"
                );
                store.set(query.trade_id, stop);
                Some(stop)
            }
            None => None,
        }
    }
}

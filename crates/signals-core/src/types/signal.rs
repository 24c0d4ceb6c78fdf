//! Entry/exit signal types.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, IndicatorError};
use crate::types::{CandleTable, Mask};

/// Column name carrying the entry signal.
pub const ENTER_LONG: &str = "enter_long";
/// Column name carrying the exit signal.
pub const EXIT_LONG: &str = "exit_long";

/// Action resolved from one signal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    Enter,
    Exit,
    Hold,
}

impl SignalAction {
    /// Exit takes precedence when both flags are raised.
    pub fn resolve(enter: bool, exit: bool) -> Self {
        match (enter, exit) {
            (_, true) => SignalAction::Exit,
            (true, false) => SignalAction::Enter,
            (false, false) => SignalAction::Hold,
        }
    }
}

/// Per-candle entry and exit flags. The two are not mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signals {
    pub enter: Mask,
    pub exit: Mask,
}

impl Signals {
    pub fn new(enter: Mask, exit: Mask) -> Result<Self, IndicatorError> {
        if enter.len() != exit.len() {
            return Err(IndicatorError::Alignment {
                left: enter.len(),
                right: exit.len(),
            });
        }
        Ok(Self { enter, exit })
    }

    pub fn len(&self) -> usize {
        self.enter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enter.is_empty()
    }

    pub fn action_at(&self, index: usize) -> SignalAction {
        SignalAction::resolve(self.enter.get(index), self.exit.get(index))
    }

    /// Action for the newest candle.
    pub fn latest(&self) -> SignalAction {
        match self.len().checked_sub(1) {
            Some(i) => self.action_at(i),
            None => SignalAction::Hold,
        }
    }

    /// Clear both flags for positions `0..count`.
    pub fn clear_prefix(&mut self, count: usize) {
        self.enter.clear_prefix(count);
        self.exit.clear_prefix(count);
    }

    /// Write `enter_long` / `exit_long` columns (1.0 / 0.0).
    pub fn attach(&self, table: &mut CandleTable) -> Result<(), DataError> {
        table.insert_column(ENTER_LONG, self.enter.to_series())?;
        table.insert_column(EXIT_LONG, self.exit.to_series())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_wins() {
        assert_eq!(SignalAction::resolve(true, true), SignalAction::Exit);
        assert_eq!(SignalAction::resolve(true, false), SignalAction::Enter);
        assert_eq!(SignalAction::resolve(false, false), SignalAction::Hold);
    }

    #[test]
    fn test_latest_action() {
        let signals = Signals::new(
            Mask::new(vec![true, false, true]),
            Mask::new(vec![false, true, false]),
        )
        .unwrap();

        assert_eq!(signals.action_at(1), SignalAction::Exit);
        assert_eq!(signals.latest(), SignalAction::Enter);
        assert_eq!(Signals::default().latest(), SignalAction::Hold);
    }
}

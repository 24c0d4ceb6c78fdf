//! Per-run signal report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signals_core::{CandleTable, SignalAction, Signals, StrategyMetadata, Timeframe};

/// A candle whose resolved action is not `Hold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub index: usize,
    pub timestamp: i64,
    pub datetime: Option<DateTime<Utc>>,
    pub action: SignalAction,
    pub close: f64,
}

/// Summary of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub strategy: String,
    pub pair: String,
    pub timeframe: Timeframe,
    pub candles: usize,
    pub startup_candle_count: usize,
    pub first_candle: Option<DateTime<Utc>>,
    pub last_candle: Option<DateTime<Utc>>,
    /// Rows with the entry flag raised
    pub entries: usize,
    /// Rows with the exit flag raised
    pub exits: usize,
    /// Rows with both flags raised; they resolve to exit
    pub conflicts: usize,
    pub latest: SignalAction,
    pub stoploss: f64,
    pub events: Vec<SignalEvent>,
}

impl SignalReport {
    pub fn new(
        strategy: &str,
        metadata: &StrategyMetadata,
        table: &CandleTable,
        signals: &Signals,
    ) -> Self {
        let events = (0..signals.len())
            .filter_map(|index| {
                let action = signals.action_at(index);
                if action == SignalAction::Hold {
                    return None;
                }
                let candle = table.candle(index)?;
                Some(SignalEvent {
                    index,
                    timestamp: candle.timestamp,
                    datetime: candle.datetime(),
                    action,
                    close: candle.close,
                })
            })
            .collect();

        let conflicts = (0..signals.len())
            .filter(|&i| signals.enter.get(i) && signals.exit.get(i))
            .count();

        Self {
            strategy: strategy.to_string(),
            pair: table.pair().to_string(),
            timeframe: table.timeframe(),
            candles: table.len(),
            startup_candle_count: metadata.startup_candle_count,
            first_candle: table.candle(0).and_then(|c| c.datetime()),
            last_candle: table.last_candle().and_then(|c| c.datetime()),
            entries: signals.enter.count(),
            exits: signals.exit.count(),
            conflicts,
            latest: signals.latest(),
            stoploss: metadata.stoploss,
            events,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let when = |t: Option<DateTime<Utc>>| match t {
            Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
            None => "-".to_string(),
        };

        let mut s = String::new();
        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                      SIGNAL REPORT                         \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!("  Pair:                {} {}\n", self.pair, self.timeframe));
        s.push_str(&format!("  Candles:             {}\n", self.candles));
        s.push_str(&format!("  Startup candles:     {}\n", self.startup_candle_count));
        s.push_str(&format!("  From:                {}\n", when(self.first_candle)));
        s.push_str(&format!("  To:                  {}\n", when(self.last_candle)));
        s.push('\n');

        s.push_str("SIGNALS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Entries:             {}\n", self.entries));
        s.push_str(&format!("  Exits:               {}\n", self.exits));
        s.push_str(&format!("  Entry+exit rows:     {}\n", self.conflicts));
        s.push_str(&format!("  Latest action:       {:?}\n", self.latest));
        s.push_str(&format!("  Stoploss:            {:.2}%\n", self.stoploss * 100.0));
        s.push('\n');

        if !self.events.is_empty() {
            s.push_str("RECENT EVENTS\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            let skip = self.events.len().saturating_sub(10);
            for event in &self.events[skip..] {
                s.push_str(&format!(
                    "  {:>6}  {}  {:<5}  {:.4}\n",
                    event.index,
                    when(event.datetime),
                    format!("{:?}", event.action),
                    event.close
                ));
            }
            s.push('\n');
        }

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

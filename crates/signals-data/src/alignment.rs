//! Joining slower informative tables onto a primary table.

use serde::{Deserialize, Serialize};
use signals_core::{CandleTable, DataError, Series, Timeframe};
use tracing::debug;

/// Name an informative column receives on the primary table, e.g. `sma50_5m`.
pub fn informative_column(name: &str, timeframe: Timeframe) -> String {
    format!("{name}_{timeframe}")
}

/// Which informative row a primary candle may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAlignment {
    /// Newest informative row with `inf.ts <= primary.ts`.
    #[default]
    OpenTime,
    /// Newest informative row that has closed by the time the primary
    /// candle closes: `inf.ts + inf_tf - primary_tf <= primary.ts`.
    CloseTime,
}

/// Copy `columns` of `informative` onto `primary`, aligned by open time.
///
/// Each primary candle takes the values of the most recent informative
/// row with `timestamp <= primary.timestamp` and keeps them until the next
/// one. Primary candles before the first informative row stay undefined.
/// Columns are written as `{name}_{informative timeframe}`; the written
/// names are returned.
///
/// Fails with [`DataError::Alignment`] when the informative timeframe is
/// faster than the primary one, and with [`DataError::UnknownColumn`] when
/// a requested column is missing.
pub fn merge_informative(
    primary: &mut CandleTable,
    informative: &CandleTable,
    columns: &[&str],
) -> Result<Vec<String>, DataError> {
    merge_informative_with(primary, informative, columns, MergeAlignment::OpenTime)
}

/// [`merge_informative`] with an explicit alignment rule.
pub fn merge_informative_with(
    primary: &mut CandleTable,
    informative: &CandleTable,
    columns: &[&str],
    alignment: MergeAlignment,
) -> Result<Vec<String>, DataError> {
    let primary_tf = primary.timeframe();
    let inf_tf = informative.timeframe();
    if inf_tf.as_millis() < primary_tf.as_millis() {
        return Err(DataError::Alignment(format!(
            "informative timeframe {inf_tf} is faster than primary timeframe {primary_tf}"
        )));
    }
    let offset = match alignment {
        MergeAlignment::OpenTime => 0,
        MergeAlignment::CloseTime => inf_tf.as_millis() - primary_tf.as_millis(),
    };

    let sources = columns
        .iter()
        .map(|name| informative.require(name))
        .collect::<Result<Vec<_>, _>>()?;

    // Index of the informative row visible at each primary row.
    let inf_ts = informative.timestamps();
    let mut visible: Vec<Option<usize>> = Vec::with_capacity(primary.len());
    let mut next = 0usize;
    for &ts in primary.timestamps() {
        while next < inf_ts.len() && inf_ts[next] + offset <= ts {
            next += 1;
        }
        visible.push(next.checked_sub(1));
    }

    let mut written = Vec::with_capacity(columns.len());
    for (name, source) in columns.iter().zip(&sources) {
        let merged: Series = visible
            .iter()
            .map(|row| row.and_then(|j| source.get(j)))
            .collect();
        let column = informative_column(name, inf_tf);
        primary.insert_column(column.as_str(), merged)?;
        written.push(column);
    }

    debug!(
        primary = %primary.pair(),
        informative = %informative.pair(),
        timeframe = %inf_tf,
        ?alignment,
        columns = written.len(),
        matched = visible.iter().filter(|v| v.is_some()).count(),
        "Merged informative columns"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::Candle;

    fn table(pair: &str, tf: Timeframe, closes: &[f64]) -> CandleTable {
        let step = tf.as_millis();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * step, c, c, c, c, 1.0))
            .collect();
        CandleTable::new(pair, tf, candles).unwrap()
    }

    #[test]
    fn test_same_timeframe_aligns_by_timestamp() {
        let mut primary = table("ETH/USDT", Timeframe::Minute5, &[1.0, 2.0, 3.0]);
        let informative = table("BTC/USDT", Timeframe::Minute5, &[10.0, 20.0, 30.0]);

        let names = merge_informative(&mut primary, &informative, &["close"]).unwrap();
        assert_eq!(names, vec!["close_5m"]);
        assert_eq!(primary.column("close_5m").unwrap().values(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_slower_timeframe_visible_from_open() {
        let mut primary = table("ETH/USDT", Timeframe::Minute5, &[1.0; 24]);
        let informative = table("BTC/USDT", Timeframe::Hour1, &[100.0, 200.0]);

        merge_informative(&mut primary, &informative, &["close"]).unwrap();
        let merged = primary.column("close_1h").unwrap();

        assert_eq!(merged.get(0), Some(100.0));
        assert_eq!(merged.get(11), Some(100.0));
        assert_eq!(merged.get(12), Some(200.0));
        assert_eq!(merged.get(23), Some(200.0));
    }

    #[test]
    fn test_primary_before_first_informative_row_is_undefined() {
        let mut primary = table("ETH/USDT", Timeframe::Minute5, &[1.0; 4]);
        let candles = vec![Candle::new(600_000, 7.0, 7.0, 7.0, 7.0, 1.0)];
        let informative = CandleTable::new("BTC/USDT", Timeframe::Minute5, candles).unwrap();

        merge_informative(&mut primary, &informative, &["close"]).unwrap();
        let merged = primary.column("close_5m").unwrap();
        assert_eq!(merged.get(1), None);
        assert_eq!(merged.get(2), Some(7.0));
        assert_eq!(merged.get(3), Some(7.0));
    }

    #[test]
    fn test_close_time_alignment_waits_for_close() {
        // 1h informative candles at 0 and 60 minutes
        let mut primary = table("ETH/USDT", Timeframe::Minute5, &[1.0; 24]);
        let informative = table("BTC/USDT", Timeframe::Hour1, &[100.0, 200.0]);

        merge_informative_with(&mut primary, &informative, &["close"], MergeAlignment::CloseTime)
            .unwrap();
        let merged = primary.column("close_1h").unwrap();

        // the first hour closes with the candle starting at 55 minutes
        assert_eq!(merged.get(10), None);
        assert_eq!(merged.get(11), Some(100.0));
        assert_eq!(merged.get(22), Some(100.0));
        assert_eq!(merged.get(23), Some(200.0));
    }

    #[test]
    fn test_faster_informative_rejected() {
        let mut primary = table("ETH/USDT", Timeframe::Hour1, &[1.0, 2.0]);
        let informative = table("BTC/USDT", Timeframe::Minute5, &[1.0, 2.0]);
        assert!(matches!(
            merge_informative(&mut primary, &informative, &["close"]),
            Err(DataError::Alignment(_))
        ));
    }

    #[test]
    fn test_unknown_column() {
        let mut primary = table("ETH/USDT", Timeframe::Minute5, &[1.0]);
        let informative = table("BTC/USDT", Timeframe::Minute5, &[1.0]);
        assert!(matches!(
            merge_informative(&mut primary, &informative, &["sma50"]),
            Err(DataError::UnknownColumn(_))
        ));
        assert!(!primary.has_column("sma50_5m"));
    }
}

//! CSV candle source and writer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use signals_core::{Candle, CandleTable, DataError, Timeframe};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Candle table source backed by a CSV file.
///
/// Expected columns are `date` (or `timestamp`), `open`, `high`, `low`,
/// `close` and `volume`. Rows may appear in any order; duplicate
/// timestamps are rejected.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    /// Create a new CSV candle source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row into a table for `pair` / `timeframe`.
    pub fn load(&self, pair: &str, timeframe: Timeframe) -> Result<CandleTable, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut candles = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;
            candles.push(Candle::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        if candles.is_empty() {
            return Err(DataError::NoDataAvailable(format!(
                "{} contains no candles",
                self.path.display()
            )));
        }

        candles.sort_by_key(|c| c.timestamp);
        if let Some(pair_of_rows) = candles.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(DataError::ParseError(format!(
                "duplicate timestamp {} in {}",
                pair_of_rows[0].timestamp,
                self.path.display()
            )));
        }

        info!(
            path = %self.path.display(),
            pair,
            timeframe = %timeframe,
            candles = candles.len(),
            "Loaded candles"
        );
        CandleTable::new(pair, timeframe, candles)
    }
}

/// Parse the date formats found in exchange exports, or unix seconds /
/// milliseconds.
pub(crate) fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let date_str = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp; more than 10 digits means milliseconds
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts.abs() > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write `table` with every derived column. Undefined values are left empty.
pub fn write_csv(table: &CandleTable, path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let derived: Vec<&str> = table.derived_columns().collect();
    let header = ["date", "open", "high", "low", "close", "volume"]
        .into_iter()
        .chain(derived.iter().copied());
    writer
        .write_record(header)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    for (i, candle) in table.candles().enumerate() {
        let date = candle
            .datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| candle.timestamp.to_string());
        let mut row = vec![
            date,
            candle.open.to_string(),
            candle.high.to_string(),
            candle.low.to_string(),
            candle.close.to_string(),
            candle.volume.to_string(),
        ];
        for name in &derived {
            row.push(format_value(table.column(name).and_then(|s| s.get(i))));
        }
        writer
            .write_record(&row)
            .map_err(|e| DataError::ParseError(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| DataError::ParseError(e.to_string()))?;
    debug!(path = %path.display(), rows = table.len(), columns = derived.len(), "Wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::Series;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_timestamp("1970-01-01 00:05:00").unwrap(), 300_000);
        assert_eq!(parse_timestamp("1970-01-01T00:05:00Z").unwrap(), 300_000);
        assert_eq!(parse_timestamp("1970-01-01 01:00:00+01:00").unwrap(), 0);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sorts_rows() {
        let file = write_file(
            "date,open,high,low,close,volume\n\
             1970-01-01 00:10:00,3,3,3,3,1\n\
             1970-01-01 00:00:00,1,1,1,1,1\n\
             1970-01-01 00:05:00,2,2,2,2,1\n",
        );
        let table = CsvCandleSource::new(file.path())
            .unwrap()
            .load("BTC/USDT", Timeframe::Minute5)
            .unwrap();

        assert_eq!(table.timestamps(), &[0, 300_000, 600_000]);
        assert_eq!(table.close().values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let file = write_file(
            "timestamp,open,high,low,close,volume\n\
             0,1,1,1,1,1\n\
             0,2,2,2,2,1\n",
        );
        let err = CsvCandleSource::new(file.path())
            .unwrap()
            .load("BTC/USDT", Timeframe::Minute5)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate timestamp"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvCandleSource::new("/definitely/not/here.csv"),
            Err(DataError::NoDataAvailable(_))
        ));
    }

    #[test]
    fn test_write_then_read_back_base_columns() {
        let file = write_file(
            "date,open,high,low,close,volume\n\
             1970-01-01 00:00:00,1,2,0.5,1.5,10\n\
             1970-01-01 00:05:00,1.5,2.5,1,2,20\n",
        );
        let mut table = CsvCandleSource::new(file.path())
            .unwrap()
            .load("BTC/USDT", Timeframe::Minute5)
            .unwrap();
        table
            .insert_column("sma", Series::new(vec![f64::NAN, 1.75]))
            .unwrap();

        let out = tempfile::NamedTempFile::new().unwrap();
        write_csv(&table, out.path()).unwrap();
        let text = std::fs::read_to_string(out.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,open,high,low,close,volume,sma");
        assert_eq!(lines[1], "1970-01-01 00:00:00,1,2,0.5,1.5,10,");
        assert_eq!(lines[2], "1970-01-01 00:05:00,1.5,2.5,1,2,20,1.75");

        let reloaded = CsvCandleSource::new(out.path())
            .unwrap()
            .load("BTC/USDT", Timeframe::Minute5)
            .unwrap();
        assert_eq!(reloaded.close().values(), table.close().values());
    }
}

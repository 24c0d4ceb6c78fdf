//! Loading a primary and an informative pair from CSV and joining them.

use signals_core::{DataProvider, Timeframe};
use signals_data::{
    load_csv, merge_informative, merge_informative_with, write_csv, CandleStore, MergeAlignment,
};
use std::fmt::Write as _;

fn csv_file(dir: &tempfile::TempDir, name: &str, step_secs: i64, closes: &[f64]) -> std::path::PathBuf {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        writeln!(text, "{},{close},{close},{close},{close},1", i as i64 * step_secs).unwrap();
    }
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn hourly_btc_joins_five_minute_eth_by_open_time() {
    let dir = tempfile::tempdir().unwrap();
    let eth = csv_file(&dir, "eth.csv", 300, &[10.0; 36]);
    let btc = csv_file(&dir, "btc.csv", 3_600, &[100.0, 200.0, 300.0]);

    let informative = load_csv(&btc, "BTC/USDT", Timeframe::Hour1).unwrap();
    let mut primary = load_csv(&eth, "ETH/USDT", Timeframe::Minute5).unwrap();
    merge_informative(&mut primary, &informative, &["close"]).unwrap();

    let merged = primary.column("close_1h").unwrap();
    assert_eq!(merged.get(0), Some(100.0));
    assert_eq!(merged.get(11), Some(100.0));
    assert_eq!(merged.get(12), Some(200.0));
    assert_eq!(merged.get(24), Some(300.0));
}

#[test]
fn hourly_btc_joins_five_minute_eth_at_close_time() {
    let dir = tempfile::tempdir().unwrap();
    let eth = csv_file(&dir, "eth.csv", 300, &[10.0; 36]);
    let btc = csv_file(&dir, "btc.csv", 3_600, &[100.0, 200.0, 300.0]);

    let mut store = CandleStore::new();
    store.insert(load_csv(&btc, "BTC/USDT", Timeframe::Hour1).unwrap());
    let mut primary = load_csv(&eth, "ETH/USDT", Timeframe::Minute5).unwrap();

    let informative = store.table("BTC/USDT", Timeframe::Hour1).unwrap();
    let names =
        merge_informative_with(&mut primary, informative, &["close"], MergeAlignment::CloseTime)
            .unwrap();
    assert_eq!(names, vec!["close_1h".to_string()]);

    let merged = primary.column("close_1h").unwrap();
    // hour n is visible from the candle opening at minute 55 of that hour
    assert_eq!(merged.get(10), None);
    assert_eq!(merged.get(11), Some(100.0));
    assert_eq!(merged.get(23), Some(200.0));
    assert_eq!(merged.get(35), Some(300.0));

    let out = dir.path().join("merged.csv");
    write_csv(&primary, &out).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("date,open,high,low,close,volume,close_1h"));
    // undefined values are written empty
    assert_eq!(lines.next(), Some("1970-01-01 00:00:00,10,10,10,10,1,"));
}

#[test]
fn store_lookup_is_keyed_by_pair_and_timeframe() {
    let dir = tempfile::tempdir().unwrap();
    let btc = csv_file(&dir, "btc.csv", 300, &[1.0, 2.0]);

    let mut store = CandleStore::new();
    store.insert(load_csv(&btc, "BTC/USDT", Timeframe::Minute5).unwrap());

    assert!(store.table("BTC/USDT", Timeframe::Minute5).is_some());
    assert!(store.table("BTC/USDT", Timeframe::Hour1).is_none());
    assert!(store.table("ETH/USDT", Timeframe::Minute5).is_none());
}

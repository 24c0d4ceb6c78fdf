//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use signals_core::{Candle, CandleIndicator, CandleTable, Indicator, Series, Timeframe};
use signals_indicators::{simd, Ehma, Hma, Thma, VwapTrend, Wma};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn generate_table(size: usize) -> CandleTable {
    let candles = generate_test_data(size)
        .into_iter()
        .enumerate()
        .map(|(i, p)| Candle::new(i as i64 * 300_000, p, p + 0.5, p - 0.5, p + 0.1, 100.0))
        .collect();
    CandleTable::new("BENCH/USDT", Timeframe::Minute5, candles).expect("valid bench table")
}

fn benchmark_wma(c: &mut Criterion) {
    let mut group = c.benchmark_group("WMA");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);
        let series = Series::new(data.clone());

        group.bench_with_input(BenchmarkId::new("indicator", size), &series, |b, series| {
            let wma = Wma::new(55).expect("valid period");
            b.iter(|| wma.calculate(black_box(series)))
        });

        group.bench_with_input(BenchmarkId::new("simd", size), &data, |b, data| {
            b.iter(|| simd::wma_simd(black_box(data), black_box(55)))
        });
    }

    group.finish();
}

fn benchmark_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hull");

    for size in [1000, 10000, 100000].iter() {
        let series = Series::new(generate_test_data(*size));

        group.bench_with_input(BenchmarkId::new("hma", size), &series, |b, series| {
            let hma = Hma::new(75).expect("valid period");
            b.iter(|| hma.calculate(black_box(series)))
        });

        group.bench_with_input(BenchmarkId::new("thma", size), &series, |b, series| {
            let thma = Thma::new(75).expect("valid period");
            b.iter(|| thma.calculate(black_box(series)))
        });

        group.bench_with_input(BenchmarkId::new("ehma", size), &series, |b, series| {
            let ehma = Ehma::new(75).expect("valid period");
            b.iter(|| ehma.calculate(black_box(series)))
        });
    }

    group.finish();
}

fn benchmark_vwap_trend(c: &mut Criterion) {
    let mut group = c.benchmark_group("VWAP trend");

    for size in [1000, 10000, 100000].iter() {
        let table = generate_table(*size);

        group.bench_with_input(BenchmarkId::new("streaming", size), &table, |b, table| {
            let trend = VwapTrend::new(15).expect("valid backcandles");
            b.iter(|| trend.calculate(black_box(table)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_wma, benchmark_hull, benchmark_vwap_trend);
criterion_main!(benches);

use proptest::prelude::*;
use signals_core::{Candle, CandleTable, Reducer, Series, Timeframe};

fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0f64..1_000.0, 0..120)
}

proptest! {
    /// shift(k)[i] == s[i-k] for i >= k, undefined before.
    #[test]
    fn shift_lags_by_k(data in values(), k in 0usize..20) {
        let series = Series::new(data.clone());
        let shifted = series.shift(k as isize).unwrap();

        prop_assert_eq!(shifted.len(), data.len());
        for i in 0..data.len() {
            if i < k {
                prop_assert_eq!(shifted.get(i), None);
            } else {
                prop_assert_eq!(shifted.get(i), Some(data[i - k]));
            }
        }
    }

    /// Rolling mean equals the arithmetic mean of the trailing window.
    #[test]
    fn rolling_mean_matches_window_average(data in values(), w in 1usize..30) {
        let series = Series::new(data.clone());
        let mean = series.rolling(w, Reducer::Mean).unwrap();

        for i in 0..data.len() {
            if i + 1 < w {
                prop_assert_eq!(mean.get(i), None);
            } else {
                let expected = data[i + 1 - w..=i].iter().sum::<f64>() / w as f64;
                let got = mean.get(i).unwrap();
                prop_assert!((got - expected).abs() < 1e-6, "i={} got={} expected={}", i, got, expected);
            }
        }
    }

    /// cross_above is true exactly where a moves from <= b to > b.
    #[test]
    fn cross_above_matches_definition(
        pairs in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 0..80)
    ) {
        let a = Series::new(pairs.iter().map(|p| p.0).collect());
        let b = Series::new(pairs.iter().map(|p| p.1).collect());
        let crossed = a.cross_above(&b).unwrap();

        for i in 0..pairs.len() {
            let expected = i > 0
                && pairs[i].0 > pairs[i].1
                && pairs[i - 1].0 <= pairs[i - 1].1;
            prop_assert_eq!(crossed.get(i), expected);
        }
    }

    /// A rolling window touching an undefined value is undefined.
    #[test]
    fn rolling_propagates_undefined(data in prop::collection::vec(0.0f64..100.0, 10..60), hole in 0usize..10, w in 1usize..8) {
        let mut data = data;
        data[hole] = f64::NAN;
        let sum = Series::new(data.clone()).rolling(w, Reducer::Sum).unwrap();

        for i in hole..(hole + w).min(data.len()) {
            prop_assert_eq!(sum.get(i), None);
        }
    }

    /// Table construction accepts exactly the strictly increasing timestamp sequences.
    #[test]
    fn table_requires_increasing_timestamps(steps in prop::collection::vec(-2i64..5, 1..40)) {
        let mut ts = 0i64;
        let candles: Vec<Candle> = steps
            .iter()
            .map(|step| {
                ts += step;
                Candle::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0)
            })
            .collect();
        let increasing = candles.windows(2).all(|w| w[1].timestamp > w[0].timestamp);

        let result = CandleTable::new("X/Y", Timeframe::Minute1, candles);
        prop_assert_eq!(result.is_ok(), increasing);
    }
}

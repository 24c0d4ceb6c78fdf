use proptest::prelude::*;
use signals_core::{Indicator, Series};
use signals_indicators::{Ehma, Ema, Hma, Sma, Thma, Wma};

proptest! {
    /// Every indicator keeps the input length.
    #[test]
    fn outputs_match_input_length(
        data in prop::collection::vec(1.0f64..1_000.0, 0..200),
        period in 3usize..60,
    ) {
        let input = Series::new(data.clone());
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(period).unwrap()),
            Box::new(Wma::new(period).unwrap()),
            Box::new(Ema::new(period).unwrap()),
            Box::new(Hma::new(period).unwrap()),
            Box::new(Thma::new(period).unwrap()),
            Box::new(Ehma::new(period).unwrap()),
        ];
        for indicator in indicators {
            prop_assert_eq!(indicator.calculate(&input).len(), data.len());
        }
    }

    /// Averages of a constant series are that constant wherever defined.
    #[test]
    fn averages_preserve_constants(value in -500.0f64..500.0, period in 3usize..40) {
        let input = Series::constant(150, value);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Wma::new(period).unwrap()),
            Box::new(Hma::new(period).unwrap()),
            Box::new(Thma::new(period).unwrap()),
            Box::new(Ehma::new(period).unwrap()),
        ];
        for indicator in indicators {
            for v in indicator.calculate(&input).iter().flatten() {
                prop_assert!((v - value).abs() < 1e-8 * value.abs().max(1.0));
            }
        }
    }

    /// WMA stays inside the window's range.
    #[test]
    fn wma_bounded_by_window(data in prop::collection::vec(-100.0f64..100.0, 10..80), period in 1usize..10) {
        let out = Wma::new(period).unwrap().calculate(&Series::new(data.clone()));
        for i in (period - 1)..data.len() {
            let window = &data[i + 1 - period..=i];
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let v = out.get(i).unwrap();
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}

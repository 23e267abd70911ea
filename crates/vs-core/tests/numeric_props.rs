use proptest::prelude::*;
use vs_core::{Tolerances, max_abs_diff, nearly_equal};

proptest! {
    #[test]
    fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6, tol in 1e-12_f64..1e-2) {
        let t = Tolerances::uniform(tol);
        prop_assert_eq!(nearly_equal(a, b, t), nearly_equal(b, a, t));
    }

    #[test]
    fn max_abs_diff_bounds_every_entry(
        pairs in prop::collection::vec((-10.0_f64..10.0, -10.0_f64..10.0), 0..32),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let worst = max_abs_diff(&a, &b);
        for (x, y) in a.iter().zip(&b) {
            prop_assert!((x - y).abs() <= worst);
        }
    }
}

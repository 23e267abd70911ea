//! Sign and magnitude conventions of blob specifications.

use proptest::prelude::*;
use vs_grid::Grid;
use vs_solver::{InitialCondition, VortexBlob};

fn field(blob: VortexBlob) -> nalgebra::DVector<f64> {
    let grid = Grid::new(16, 10.0).unwrap();
    InitialCondition::blobs(vec![blob]).unwrap().synthesize(&grid)
}

#[test]
fn negative_x_scale_subtracts() {
    let positive = field(VortexBlob::new(1.0, -2.0, 1.0, 1.0).unwrap());
    let negative = field(VortexBlob::new(1.0, -2.0, -1.0, 1.0).unwrap());
    assert_eq!(negative, -positive);
}

#[test]
fn negative_y_scale_subtracts() {
    let positive = field(VortexBlob::new(1.0, -2.0, 1.0, 1.0).unwrap());
    let negative = field(VortexBlob::new(1.0, -2.0, 1.0, -1.0).unwrap());
    assert_eq!(negative, -positive);
}

#[test]
fn both_negative_still_subtracts_once() {
    let positive = field(VortexBlob::new(0.0, 0.0, 2.0, 3.0).unwrap());
    let negative = field(VortexBlob::new(0.0, 0.0, -2.0, -3.0).unwrap());
    assert_eq!(negative, -positive);
}

#[test]
fn blobs_superpose_in_order() {
    let grid = Grid::new(16, 10.0).unwrap();
    let a = VortexBlob::new(-3.0, 0.0, 1.0, 2.0).unwrap();
    let b = VortexBlob::new(3.0, 1.0, -0.5, 1.0).unwrap();
    let both = InitialCondition::blobs(vec![a, b]).unwrap().synthesize(&grid);
    let sum = field(a) + field(b);
    assert!((both - sum).amax() < 1e-15);
}

#[test]
fn default_analytic_matches_equivalent_blob_list() {
    let grid = Grid::new(16, 10.0).unwrap();
    let analytic = InitialCondition::Analytic.synthesize(&grid);
    let blobs = InitialCondition::blobs(vec![
        VortexBlob::new(-2.0, -2.0, 1.0, 1.0).unwrap(),
        VortexBlob::new(2.0, 2.0, 1.0, 1.0).unwrap(),
        VortexBlob::new(-2.0, 2.0, -1.0, 1.0).unwrap(),
        VortexBlob::new(2.0, -2.0, 1.0, -1.0).unwrap(),
    ])
    .unwrap()
    .synthesize(&grid);
    assert!((analytic - blobs).amax() < 1e-14);
}

proptest! {
    #[test]
    fn magnitude_ignores_sign(
        xs in -5.0_f64..5.0,
        ys in -5.0_f64..5.0,
        sx in 0.05_f64..8.0,
        sy in 0.05_f64..8.0,
        flip_x in any::<bool>(),
        flip_y in any::<bool>(),
    ) {
        let signed = VortexBlob::new(
            xs,
            ys,
            if flip_x { -sx } else { sx },
            if flip_y { -sy } else { sy },
        ).unwrap();
        let plain = VortexBlob::new(xs, ys, sx, sy).unwrap();
        let expected_sign = if flip_x || flip_y { -1.0 } else { 1.0 };

        prop_assert_eq!(signed.sign(), expected_sign);
        for (x, y) in [(0.0, 0.0), (xs, ys), (1.5, -2.5)] {
            prop_assert_eq!(signed.profile(x, y), plain.profile(x, y));
            prop_assert_eq!(signed.evaluate(x, y), expected_sign * plain.profile(x, y));
        }
    }
}

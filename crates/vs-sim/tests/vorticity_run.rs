//! End-to-end vorticity integration on small grids.

use nalgebra::DVector;
use vs_grid::Grid;
use vs_solver::{InitialCondition, VortexBlob};
use vs_sim::{SimError, SimOptions, TransientModel, VorticityModel, run_sim};

fn centered_blob_model(n: usize) -> (Grid, VorticityModel) {
    let grid = Grid::new(n, 10.0).unwrap();
    let ic = InitialCondition::blobs(vec![VortexBlob::new(0.0, 0.0, 1.0, 1.0).unwrap()]).unwrap();
    let model = VorticityModel::from_grid(&grid, &ic, 0.001, 1e-6).unwrap();
    (grid, model)
}

/// Largest difference between a field and its point reflection through the
/// grid node at coordinate zero.
fn reflection_defect(field: &DVector<f64>, n: usize) -> f64 {
    let mut worst = 0.0_f64;
    for i in 0..n {
        for j in 0..n {
            let mirrored = field[((n - i) % n) * n + (n - j) % n];
            worst = worst.max((field[i * n + j] - mirrored).abs());
        }
    }
    worst
}

#[test]
fn centered_blob_stays_point_symmetric() {
    let n = 16;
    let (grid, model) = centered_blob_model(n);
    // Coordinate zero is node n/2, which the reflection must fix.
    assert_eq!(grid.coordinates()[n / 2], 0.0);
    assert_eq!(reflection_defect(&model.initial_state(), n), 0.0);

    let t_eval = [0.0, 1.0, 2.0, 3.0];
    let rec = run_sim(&model, &t_eval, &SimOptions::with_tolerance(1e-6)).unwrap();
    for x in &rec.x {
        let peak = x.amax();
        assert!(reflection_defect(x, n) <= 1e-9 * peak.max(1.0));
    }
}

#[test]
fn repeated_runs_are_bitwise_identical() {
    let grid = Grid::new(16, 10.0).unwrap();
    let model =
        VorticityModel::from_grid(&grid, &InitialCondition::Analytic, 0.001, 1e-6).unwrap();
    let t_eval = [0.0, 1.0, 2.0];
    let opts = SimOptions::with_tolerance(1e-6);

    let a = run_sim(&model, &t_eval, &opts).unwrap();
    let b = run_sim(&model, &t_eval, &opts).unwrap();
    assert_eq!(a.stats, b.stats);
    for (xa, xb) in a.x.iter().zip(&b.x) {
        assert!(xa.iter().zip(xb.iter()).all(|(u, v)| u.to_bits() == v.to_bits()));
    }
}

#[test]
fn analytic_run_stays_finite_and_bounded() {
    let grid = Grid::new(16, 10.0).unwrap();
    let model =
        VorticityModel::from_grid(&grid, &InitialCondition::Analytic, 0.001, 1e-6).unwrap();
    let t_eval: Vec<f64> = (0..5).map(|k| k as f64).collect();
    let rec = run_sim(&model, &t_eval, &SimOptions::with_tolerance(1e-6)).unwrap();

    assert_eq!(rec.x.len(), 5);
    let initial_peak = rec.x[0].amax();
    for x in &rec.x {
        assert!(x.iter().all(|v| v.is_finite()));
        assert!(x.amax() <= 1.5 * initial_peak);
    }
}

#[test]
fn quiescent_field_takes_growing_steps() {
    let grid = Grid::new(8, 10.0).unwrap();
    let model =
        VorticityModel::from_grid(&grid, &InitialCondition::Blobs(Vec::new()), 0.001, 1e-6)
            .unwrap();
    let rec = run_sim(&model, &[0.0, 10.0], &SimOptions::with_tolerance(1e-6)).unwrap();
    assert!(rec.x[1].iter().all(|v| *v == 0.0));
    assert_eq!(rec.stats.rejected_steps, 0);
}

#[test]
fn unachievable_tolerance_reports_integration_failure() {
    let grid = Grid::new(8, 10.0).unwrap();
    let model =
        VorticityModel::from_grid(&grid, &InitialCondition::Analytic, 0.001, 1e-6).unwrap();
    let result = run_sim(&model, &[0.0, 1.0, 2.0], &SimOptions::with_tolerance(1e-300));
    assert!(matches!(
        result,
        Err(SimError::IntegrationFailure { .. })
    ));
}

//! Adaptive integration against closed-form solutions.

use std::cell::Cell;

use nalgebra::DVector;
use vs_sim::{
    SimError, SimOptions, SimProgress, SimResult, TransientModel, run_sim, run_sim_with_progress,
};

/// dy/dt = -rate * y
struct Decay {
    rate: f64,
    y0: Vec<f64>,
}

impl TransientModel for Decay {
    fn initial_state(&self) -> DVector<f64> {
        DVector::from_vec(self.y0.clone())
    }

    fn rhs(&self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(x * -self.rate)
    }
}

/// x'' = -x as a first-order pair.
struct Oscillator {
    calls: Cell<usize>,
}

impl TransientModel for Oscillator {
    fn initial_state(&self) -> DVector<f64> {
        DVector::from_vec(vec![1.0, 0.0])
    }

    fn rhs(&self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(DVector::from_vec(vec![x[1], -x[0]]))
    }
}

#[test]
fn exponential_decay_at_requested_times() {
    let model = Decay {
        rate: 1.0,
        y0: vec![1.0, -3.0, 0.5],
    };
    let t_eval = [0.0, 0.3, 0.5, 1.0, 2.0, 3.3];
    let opts = SimOptions::with_tolerance(1e-9);
    let rec = run_sim(&model, &t_eval, &opts).unwrap();

    assert_eq!(rec.t, t_eval);
    assert_eq!(rec.x.len(), t_eval.len());
    assert_eq!(rec.x[0], model.initial_state());
    for (t, x) in rec.t.iter().zip(&rec.x) {
        let decay = (-t).exp();
        for (xi, y0) in x.iter().zip(&model.y0) {
            assert!((xi - y0 * decay).abs() < 1e-6, "t = {t}: {xi} vs {}", y0 * decay);
        }
    }
    assert!(rec.stats.accepted_steps > 0);
}

#[test]
fn oscillator_returns_after_one_period() {
    let model = Oscillator {
        calls: Cell::new(0),
    };
    let period = 2.0 * std::f64::consts::PI;
    let t_eval: Vec<f64> = (0..=8).map(|k| period * k as f64 / 8.0).collect();
    let rec = run_sim(&model, &t_eval, &SimOptions::with_tolerance(1e-10)).unwrap();

    for (t, x) in rec.t.iter().zip(&rec.x) {
        assert!((x[0] - t.cos()).abs() < 1e-6);
        assert!((x[1] + t.sin()).abs() < 1e-6);
    }
    assert_eq!(rec.stats.rhs_evals, model.calls.get());
}

#[test]
fn dense_output_does_not_change_step_sequence() {
    let model = Decay {
        rate: 2.0,
        y0: vec![1.0],
    };
    let opts = SimOptions::with_tolerance(1e-6);
    let coarse = run_sim(&model, &[0.0, 2.0], &opts).unwrap();
    let fine: Vec<f64> = (0..=40).map(|k| k as f64 / 20.0).collect();
    let dense = run_sim(&model, &fine, &opts).unwrap();

    assert_eq!(coarse.stats, dense.stats);
    assert_eq!(coarse.x[1], dense.x[40]);
}

#[test]
fn single_output_time_returns_initial_state() {
    let model = Decay {
        rate: 1.0,
        y0: vec![4.0],
    };
    let rec = run_sim(&model, &[5.0], &SimOptions::default()).unwrap();
    assert_eq!(rec.t, vec![5.0]);
    assert_eq!(rec.x[0][0], 4.0);
    assert_eq!(rec.stats.rhs_evals, 0);
}

#[test]
fn invalid_output_times_rejected() {
    let model = Decay {
        rate: 1.0,
        y0: vec![1.0],
    };
    let opts = SimOptions::default();
    for t_eval in [vec![], vec![0.0, 1.0, 1.0], vec![0.0, f64::NAN]] {
        assert!(matches!(
            run_sim(&model, &t_eval, &opts),
            Err(SimError::InvalidArg { .. })
        ));
    }
}

#[test]
fn unreachable_tolerance_fails_with_time_reached() {
    let model = Oscillator {
        calls: Cell::new(0),
    };
    let result = run_sim(&model, &[0.0, 1.0], &SimOptions::with_tolerance(1e-300));
    match result {
        Err(SimError::IntegrationFailure { t_reached, .. }) => {
            assert!((0.0..1.0).contains(&t_reached));
        }
        other => panic!("expected IntegrationFailure, got {other:?}"),
    }
}

#[test]
fn step_budget_exhaustion_is_a_failure() {
    let model = Oscillator {
        calls: Cell::new(0),
    };
    let opts = SimOptions {
        max_steps: Some(3),
        ..SimOptions::with_tolerance(1e-10)
    };
    let err = run_sim(&model, &[0.0, 50.0], &opts).unwrap_err();
    assert!(matches!(err, SimError::IntegrationFailure { .. }));
    assert!(err.t_reached().unwrap() < 50.0);
}

#[test]
fn progress_is_monotonic_and_completes() {
    let model = Decay {
        rate: 1.0,
        y0: vec![1.0],
    };
    let mut seen: Vec<SimProgress> = Vec::new();
    let mut cb = |p: &SimProgress| seen.push(p.clone());
    let t_eval = [0.0, 1.0, 2.0, 4.0];
    run_sim_with_progress(&model, &t_eval, &SimOptions::default(), Some(&mut cb)).unwrap();

    assert!(!seen.is_empty());
    assert!(
        seen.windows(2)
            .all(|w| w[1].fraction_complete >= w[0].fraction_complete)
    );
    let last = seen.last().unwrap();
    assert_eq!(last.fraction_complete, 1.0);
    assert_eq!(last.outputs_emitted, t_eval.len());
}

#[test]
fn max_step_is_respected() {
    let model = Decay {
        rate: 0.01,
        y0: vec![1.0],
    };
    let opts = SimOptions {
        max_step: 0.5,
        ..SimOptions::default()
    };
    let rec = run_sim(&model, &[0.0, 10.0], &opts).unwrap();
    assert!(rec.stats.accepted_steps >= 20);
}

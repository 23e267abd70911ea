//! Adaptive simulation runner and result recording.

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, rms};
use crate::model::TransientModel;

/// Step-size controller constants.
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Initial step; chosen automatically when `None`
    pub first_step: Option<f64>,
    /// Largest step the controller may take
    pub max_step: f64,
    /// Smallest step before the run is declared failed
    pub min_step: f64,
    /// Accepted-step budget (safety limit)
    pub max_steps: Option<usize>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            first_step: None,
            max_step: f64::INFINITY,
            min_step: 0.0,
            max_steps: None,
        }
    }
}

impl SimOptions {
    /// Same value for both tolerances.
    pub fn with_tolerance(tol: f64) -> Self {
        Self {
            rtol: tol,
            atol: tol,
            ..Self::default()
        }
    }

    fn validate(&self) -> SimResult<()> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(SimError::InvalidArg {
                what: "rtol must be positive and finite",
            });
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(SimError::InvalidArg {
                what: "atol must be positive and finite",
            });
        }
        if let Some(h) = self.first_step {
            if !(h.is_finite() && h > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "first_step must be positive and finite",
                });
            }
        }
        if self.max_step.is_nan() || self.max_step <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !(self.min_step.is_finite() && self.min_step >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "min_step must be non-negative and finite",
            });
        }
        if self.max_steps == Some(0) {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Step counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evals: usize,
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord {
    /// Output times, equal to the requested times
    pub t: Vec<f64>,
    /// State at each output time
    pub x: Vec<DVector<f64>>,
    pub stats: SimStats,
}

/// Progress snapshot, reported after every accepted step.
#[derive(Clone, Debug)]
pub struct SimProgress {
    pub t: f64,
    pub t_end: f64,
    /// 0.0 to 1.0
    pub fraction_complete: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub outputs_emitted: usize,
}

/// Integrate `model` from `t_eval[0]`, reporting the state at every time in
/// `t_eval`.
pub fn run_sim<M: TransientModel>(
    model: &M,
    t_eval: &[f64],
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    run_sim_with_progress(model, t_eval, opts, None)
}

/// [`run_sim`] with an optional progress callback.
pub fn run_sim_with_progress<M: TransientModel>(
    model: &M,
    t_eval: &[f64],
    opts: &SimOptions,
    mut progress: Option<&mut dyn FnMut(&SimProgress)>,
) -> SimResult<SimRecord> {
    validate_t_eval(t_eval)?;
    opts.validate()?;

    let t0 = t_eval[0];
    let t_end = t_eval[t_eval.len() - 1];

    let mut y = model.initial_state();
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        warn!(index = i, "non-finite initial state");
        return Err(SimError::NonFinite {
            t: t0,
            what: "initial state",
        });
    }

    let mut stats = SimStats::default();
    let mut t_out = Vec::with_capacity(t_eval.len());
    let mut x_out = Vec::with_capacity(t_eval.len());
    t_out.push(t0);
    x_out.push(y.clone());

    if t_eval.len() == 1 {
        return Ok(SimRecord {
            t: t_out,
            x: x_out,
            stats,
        });
    }

    let span = t_end - t0;
    let mut f = model.rhs(t0, &y)?;
    stats.rhs_evals += 1;

    let mut h_abs = match opts.first_step {
        Some(h) => h.min(span),
        None => {
            let h = initial_step(model, t0, &y, &f, span, opts)?;
            stats.rhs_evals += 1;
            h
        }
    };
    debug!(t0, t_end, h0 = h_abs, dim = y.len(), "starting integration");

    let stepper = DormandPrince45;
    let exponent = -1.0 / (DormandPrince45::ERROR_ESTIMATOR_ORDER as f64 + 1.0);
    let mut t = t0;
    let mut next_out = 1;

    while t < t_end {
        // Steps shorter than a few ulps of the interval no longer advance t.
        let h_floor = opts
            .min_step
            .max(10.0 * f64::EPSILON * t.abs().max(t_end.abs()));
        h_abs = h_abs.min(opts.max_step);

        let mut step_rejected = false;
        let (attempt, t_new) = loop {
            if h_abs < h_floor {
                warn!(t, h = h_abs, "step size collapsed");
                return Err(SimError::IntegrationFailure {
                    t_reached: t,
                    reason: format!(
                        "required step size {h_abs:e} fell below the minimum {h_floor:e}"
                    ),
                });
            }

            let t_trial = (t + h_abs).min(t_end);
            let h = t_trial - t;
            let attempt = stepper.attempt(model, t, &y, &f, h)?;
            stats.rhs_evals += DormandPrince45::EVALS_PER_ATTEMPT;

            let err = attempt.error_norm(&y, opts.rtol, opts.atol);
            if err.is_nan() {
                return Err(SimError::NonFinite {
                    t,
                    what: "local error estimate",
                });
            }
            if err < 1.0 {
                let mut factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    MAX_FACTOR.min(SAFETY * err.powf(exponent))
                };
                if step_rejected {
                    factor = factor.min(1.0);
                }
                h_abs = h * factor;
                break (attempt, t_trial);
            }

            stats.rejected_steps += 1;
            h_abs = h * MIN_FACTOR.max(SAFETY * err.powf(exponent));
            step_rejected = true;
        };

        if attempt.y_new().iter().any(|v| !v.is_finite()) {
            return Err(SimError::NonFinite {
                t,
                what: "accepted state",
            });
        }

        if next_out < t_eval.len() && t_eval[next_out] <= t_new {
            let segment = attempt.dense(&y);
            while next_out < t_eval.len() && t_eval[next_out] <= t_new {
                let te = t_eval[next_out];
                let state = if te == t_new {
                    attempt.y_new().clone()
                } else {
                    segment.eval(te)
                };
                debug!(t = te, index = next_out, "output recorded");
                t_out.push(te);
                x_out.push(state);
                next_out += 1;
            }
        }

        let (y_new, f_new) = attempt.into_end();
        y = y_new;
        f = f_new;
        t = t_new;
        stats.accepted_steps += 1;

        if let Some(cb) = progress.as_mut() {
            cb(&SimProgress {
                t,
                t_end,
                fraction_complete: ((t - t0) / span).clamp(0.0, 1.0),
                accepted_steps: stats.accepted_steps,
                rejected_steps: stats.rejected_steps,
                outputs_emitted: next_out,
            });
        }

        if let Some(budget) = opts.max_steps {
            if stats.accepted_steps >= budget && t < t_end {
                warn!(t, budget, "step budget exhausted");
                return Err(SimError::IntegrationFailure {
                    t_reached: t,
                    reason: format!("step budget of {budget} exhausted"),
                });
            }
        }
    }

    info!(
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        rhs_evals = stats.rhs_evals,
        "integration complete"
    );

    Ok(SimRecord {
        t: t_out,
        x: x_out,
        stats,
    })
}

fn validate_t_eval(t_eval: &[f64]) -> SimResult<()> {
    if t_eval.is_empty() {
        return Err(SimError::InvalidArg {
            what: "t_eval must not be empty",
        });
    }
    if t_eval.iter().any(|t| !t.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "t_eval must be finite",
        });
    }
    if t_eval.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SimError::InvalidArg {
            what: "t_eval must be strictly increasing",
        });
    }
    Ok(())
}

/// Starting step from the size of the state, its derivative and an
/// estimate of the second derivative (Hairer, Norsett and Wanner).
fn initial_step<M: TransientModel>(
    model: &M,
    t0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    span: f64,
    opts: &SimOptions,
) -> SimResult<f64> {
    if y0.is_empty() {
        return Ok(span);
    }

    let scale = y0.map(|v| opts.atol + v.abs() * opts.rtol);
    let d0 = rms(&y0.component_div(&scale));
    let d1 = rms(&f0.component_div(&scale));

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(span);

    let y1 = y0 + f0 * h0;
    let f1 = model.rhs(t0 + h0, &y1)?;
    let d2 = rms(&(f1 - f0).component_div(&scale)) / h0;

    let order = DormandPrince45::ERROR_ESTIMATOR_ORDER as f64;
    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        1e-6_f64.max(h0 * 1e-3)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order + 1.0))
    };

    Ok((100.0 * h0).min(h1).min(span).min(opts.max_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.rtol, 1e-3);
        assert_eq!(opts.atol, 1e-6);
        assert!(opts.first_step.is_none());
        assert!(opts.max_step.is_infinite());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let bad = [
            SimOptions::with_tolerance(0.0),
            SimOptions {
                atol: f64::NAN,
                ..SimOptions::default()
            },
            SimOptions {
                first_step: Some(-1.0),
                ..SimOptions::default()
            },
            SimOptions {
                max_step: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                max_steps: Some(0),
                ..SimOptions::default()
            },
        ];
        for opts in bad {
            assert!(matches!(
                opts.validate(),
                Err(SimError::InvalidArg { .. })
            ));
        }
    }

    #[test]
    fn t_eval_must_increase() {
        assert!(validate_t_eval(&[0.0, 1.0, 2.0]).is_ok());
        assert!(validate_t_eval(&[]).is_err());
        assert!(validate_t_eval(&[0.0, 0.0]).is_err());
        assert!(validate_t_eval(&[1.0, 0.5]).is_err());
        assert!(validate_t_eval(&[0.0, f64::INFINITY]).is_err());
    }
}

//! Embedded Runge-Kutta stepping.

use nalgebra::DVector;

use crate::error::SimResult;
use crate::model::TransientModel;

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];

/// 5th-order weights. Also the last row of the tableau (FSAL).
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

/// Difference between the 5th- and 4th-order weights, over all seven stages.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Continuous extension coefficients (Hairer, contd5).
const D: [f64; 7] = [
    -12715105075.0 / 11282082432.0,
    0.0,
    87487479700.0 / 32700410799.0,
    -10690763975.0 / 1880347072.0,
    701980252875.0 / 199316789632.0,
    -1453857185.0 / 822651844.0,
    69997945.0 / 29380423.0,
];

/// Dormand-Prince 5(4) pair with first-same-as-last stages.
#[derive(Clone, Copy, Debug, Default)]
pub struct DormandPrince45;

impl DormandPrince45 {
    /// Order of the propagated solution.
    pub const ORDER: u32 = 5;
    /// Order of the embedded error estimator.
    pub const ERROR_ESTIMATOR_ORDER: u32 = 4;
    /// Right-hand side evaluations per attempt, the first stage being reused.
    pub const EVALS_PER_ATTEMPT: usize = 6;

    /// Attempt one step of size `h` from `(t, y)` where `f = rhs(t, y)`.
    ///
    /// The attempt is not yet accepted; the caller decides from
    /// [`StepAttempt::error_norm`].
    pub fn attempt<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        y: &DVector<f64>,
        f: &DVector<f64>,
        h: f64,
    ) -> SimResult<StepAttempt> {
        let k1 = f.clone();
        let k2 = model.rhs(t + C[1] * h, &advance(y, h, &A2, &[&k1]))?;
        let k3 = model.rhs(t + C[2] * h, &advance(y, h, &A3, &[&k1, &k2]))?;
        let k4 = model.rhs(t + C[3] * h, &advance(y, h, &A4, &[&k1, &k2, &k3]))?;
        let k5 = model.rhs(
            t + C[4] * h,
            &advance(y, h, &A5, &[&k1, &k2, &k3, &k4]),
        )?;
        let k6 = model.rhs(
            t + C[5] * h,
            &advance(y, h, &A6, &[&k1, &k2, &k3, &k4, &k5]),
        )?;

        let y_new = advance(y, h, &B, &[&k1, &k2, &k3, &k4, &k5, &k6]);
        let t_new = t + h;
        let k7 = model.rhs(t_new, &y_new)?;

        Ok(StepAttempt {
            t,
            h,
            y_new,
            k: [k1, k2, k3, k4, k5, k6, k7],
        })
    }
}

/// `y + h * sum(a_j * k_j)`.
fn advance(y: &DVector<f64>, h: f64, a: &[f64], k: &[&DVector<f64>]) -> DVector<f64> {
    let mut dy = DVector::zeros(y.len());
    for (&coeff, stage) in a.iter().zip(k) {
        if coeff != 0.0 {
            dy.axpy(coeff, stage, 1.0);
        }
    }
    y + dy * h
}

/// Root-mean-square of a vector, zero for an empty one.
pub(crate) fn rms(v: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    (v.norm_squared() / v.len() as f64).sqrt()
}

/// Result of one trial step.
#[derive(Clone, Debug)]
pub struct StepAttempt {
    t: f64,
    h: f64,
    y_new: DVector<f64>,
    /// Stage derivatives; `k[6]` is the derivative at `y_new`.
    k: [DVector<f64>; 7],
}

impl StepAttempt {
    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn t_new(&self) -> f64 {
        self.t + self.h
    }

    pub fn y_new(&self) -> &DVector<f64> {
        &self.y_new
    }

    /// Derivative at the end of the step, reused as the next first stage.
    pub fn f_new(&self) -> &DVector<f64> {
        &self.k[6]
    }

    /// Consume the attempt, keeping the end state and its derivative.
    pub fn into_end(self) -> (DVector<f64>, DVector<f64>) {
        let [_, _, _, _, _, _, k7] = self.k;
        (self.y_new, k7)
    }

    /// Local error estimate `h * sum(e_j * k_j)`.
    pub fn error_estimate(&self) -> DVector<f64> {
        let mut err = DVector::zeros(self.y_new.len());
        for (&coeff, stage) in E.iter().zip(&self.k) {
            if coeff != 0.0 {
                err.axpy(coeff, stage, 1.0);
            }
        }
        err * self.h
    }

    /// Scaled error norm; the step is acceptable when this is below 1.
    ///
    /// Each component is weighted by `atol + max(|y|, |y_new|) * rtol`.
    pub fn error_norm(&self, y: &DVector<f64>, rtol: f64, atol: f64) -> f64 {
        let err = self.error_estimate();
        let scaled = DVector::from_fn(err.len(), |i, _| {
            let scale = atol + y[i].abs().max(self.y_new[i].abs()) * rtol;
            err[i] / scale
        });
        rms(&scaled)
    }

    /// Interpolant over `[t, t + h]`.
    pub fn dense(&self, y: &DVector<f64>) -> DenseSegment {
        let h = self.h;
        let k1 = &self.k[0];
        let k7 = &self.k[6];

        let r2 = &self.y_new - y;
        let r3 = k1 * h - &r2;
        let r4 = &r2 - k7 * h - &r3;
        let mut r5 = DVector::zeros(y.len());
        for (&coeff, stage) in D.iter().zip(&self.k) {
            if coeff != 0.0 {
                r5.axpy(coeff, stage, 1.0);
            }
        }
        r5 *= h;

        DenseSegment {
            t_old: self.t,
            h,
            r: [y.clone(), r2, r3, r4, r5],
        }
    }
}

/// Fourth-order continuous extension of one accepted step.
#[derive(Clone, Debug)]
pub struct DenseSegment {
    t_old: f64,
    h: f64,
    r: [DVector<f64>; 5],
}

impl DenseSegment {
    pub fn t_start(&self) -> f64 {
        self.t_old
    }

    pub fn t_end(&self) -> f64 {
        self.t_old + self.h
    }

    /// State at `t`, for `t` within the step.
    pub fn eval(&self, t: f64) -> DVector<f64> {
        let theta = (t - self.t_old) / self.h;
        let theta1 = 1.0 - theta;
        let [r1, r2, r3, r4, r5] = &self.r;
        // r1 + theta * (r2 + theta1 * (r3 + theta * (r4 + theta1 * r5)))
        let inner = r4 + r5 * theta1;
        let inner = r3 + inner * theta;
        let inner = r2 + inner * theta1;
        r1 + inner * theta
    }
}

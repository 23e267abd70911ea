use crate::VsError;

/// Floating point type used throughout the solver.
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Same value for both bounds, the way the run configuration exposes it.
    pub const fn uniform(tol: Real) -> Self {
        Self { abs: tol, rel: tol }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::uniform(1e-6)
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, VsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(VsError::NonFinite {
            what,
            index: 0,
            value: v,
        })
    }
}

/// Reject the first NaN/Inf in a field, reporting where it sits.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), VsError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(index) => Err(VsError::NonFinite {
            what,
            index,
            value: values[index],
        }),
    }
}

/// Largest elementwise deviation between two equally sized slices.
pub fn max_abs_diff(a: &[Real], b: &[Real]) -> Real {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, Real::max)
}

//! TransientModel trait for pluggable dynamic systems.

use nalgebra::DVector;

use crate::error::SimResult;

/// A system `dx/dt = f(t, x)` over a flat real state vector.
///
/// `rhs` takes `&self`: evaluations must not depend on call order, since the
/// adaptive integrator evaluates rejected trial states too.
pub trait TransientModel {
    /// State at the first requested time.
    fn initial_state(&self) -> DVector<f64>;

    /// Compute the state derivative.
    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>>;

    /// Length of the state vector.
    fn dim(&self) -> usize {
        self.initial_state().len()
    }
}

//! Vorticity transport as a transient model.

use nalgebra::DVector;
use vs_grid::Grid;
use vs_solver::{InitialCondition, VorticityRhs};

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

/// The vorticity right-hand side bound to its starting field.
#[derive(Clone, Debug)]
pub struct VorticityModel {
    rhs: VorticityRhs,
    initial: DVector<f64>,
}

impl VorticityModel {
    pub fn new(rhs: VorticityRhs, initial: DVector<f64>) -> SimResult<Self> {
        if initial.len() != rhs.dim() {
            return Err(SimError::InvalidArg {
                what: "initial field length does not match the grid",
            });
        }
        Ok(Self { rhs, initial })
    }

    /// Build operators for `grid` and synthesize `ic` on it.
    pub fn from_grid(grid: &Grid, ic: &InitialCondition, nu: f64, tol: f64) -> SimResult<Self> {
        let rhs = VorticityRhs::new(grid, nu, tol)?;
        Self::new(rhs, ic.synthesize(grid))
    }

    pub fn vorticity_rhs(&self) -> &VorticityRhs {
        &self.rhs
    }
}

impl TransientModel for VorticityModel {
    fn initial_state(&self) -> DVector<f64> {
        self.initial.clone()
    }

    fn rhs(&self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(self.rhs.evaluate(x)?)
    }

    fn dim(&self) -> usize {
        self.initial.len()
    }
}

//! Right-hand side of the vorticity transport equation.

use nalgebra::DVector;
use vs_core::ensure_all_finite;
use vs_core::timing::{Timer, solver_timing};
use vs_grid::{Grid, PeriodicOperators, WavenumberMesh};

use crate::error::{SolverError, SolverResult};
use crate::poisson::SpectralPoisson;

/// Kinematic viscosity used when the configuration does not override it.
pub const DEFAULT_VISCOSITY: f64 = 0.001;

/// `d(omega)/dt = nu * lap(omega) - J(psi, omega)`.
///
/// Holds only immutable operators, so evaluations are pure functions of the
/// state and may be repeated at any integrator substep.
#[derive(Clone, Debug)]
pub struct VorticityRhs {
    operators: PeriodicOperators,
    poisson: SpectralPoisson,
    nu: f64,
}

impl VorticityRhs {
    /// Build operators, wavenumbers and the FFT plans for `grid`.
    ///
    /// `tol` is the zero-wavenumber substitute.
    pub fn new(grid: &Grid, nu: f64, tol: f64) -> SolverResult<Self> {
        let operators = PeriodicOperators::build(grid)?;
        let mesh = WavenumberMesh::build(grid, tol)?;
        let poisson = SpectralPoisson::new(grid, &mesh)?;
        Self::from_parts(operators, poisson, nu)
    }

    pub fn from_parts(
        operators: PeriodicOperators,
        poisson: SpectralPoisson,
        nu: f64,
    ) -> SolverResult<Self> {
        if !nu.is_finite() || nu < 0.0 {
            return Err(SolverError::InvalidParameter {
                what: format!("viscosity must be finite and non-negative, got {nu}"),
            });
        }
        if operators.lap.dim() != poisson.dim() {
            return Err(SolverError::Dimension {
                what: "operators vs. Poisson solver",
                expected: poisson.dim(),
                actual: operators.lap.dim(),
            });
        }
        Ok(Self {
            operators,
            poisson,
            nu,
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn operators(&self) -> &PeriodicOperators {
        &self.operators
    }

    /// Length of the state vector.
    pub fn dim(&self) -> usize {
        self.poisson.dim()
    }

    pub fn stream_function(&self, omega: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.poisson.solve(omega)
    }

    /// Advection term `dx(psi) * dy(omega) - dy(psi) * dx(omega)`.
    pub fn jacobian(&self, psi: &DVector<f64>, omega: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let ops = &self.operators;
        let block1 = ops.dx.apply(psi)?.component_mul(&ops.dy.apply(omega)?);
        let block2 = ops.dy.apply(psi)?.component_mul(&ops.dx.apply(omega)?);
        Ok(block1 - block2)
    }

    /// Diffusion term `nu * lap(omega)`.
    pub fn diffusion(&self, omega: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(self.operators.lap.apply(omega)? * self.nu)
    }

    /// Time derivative of the vorticity.
    pub fn evaluate(&self, omega: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let timer = Timer::start();

        let psi = self.stream_function(omega)?;
        let advection = self.jacobian(&psi, omega)?;
        let d_omega = self.diffusion(omega)? - advection;
        ensure_all_finite(d_omega.as_slice(), "vorticity derivative")?;

        timer.stop_into(&solver_timing::RHS_EVALS);
        Ok(d_omega)
    }
}

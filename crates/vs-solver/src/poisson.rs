//! Spectral stream-function recovery.

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use vs_core::timing::{Timer, solver_timing};
use vs_grid::{Grid, WavenumberMesh};

use crate::error::{SolverError, SolverResult};

/// Periodic Poisson inversion by 2D FFT.
///
/// `psi_hat = -omega_hat / (kx^2 + ky^2)`. The zero mode divides by the
/// perturbed `2 * tol^2` instead of being dropped, which pins the additive
/// constant of `psi` to the mean of `omega`.
#[derive(Clone)]
pub struct SpectralPoisson {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    /// `kx^2 + ky^2`, row-major.
    k_squared: Vec<f64>,
}

impl SpectralPoisson {
    pub fn new(grid: &Grid, mesh: &WavenumberMesh) -> SolverResult<Self> {
        let n = grid.n();
        let k2 = mesh.k_squared();
        if k2.nrows() != n || k2.ncols() != n {
            return Err(SolverError::Dimension {
                what: "wavenumber mesh",
                expected: n,
                actual: k2.nrows(),
            });
        }

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let k_squared = (0..n * n).map(|k| k2[(k / n, k % n)]).collect();
        tracing::debug!(n, zero_mode = k2[(0, 0)], "planned Poisson FFTs");

        Ok(Self {
            n,
            forward,
            inverse,
            k_squared,
        })
    }

    /// Length of the flattened fields this solver accepts.
    pub fn dim(&self) -> usize {
        self.n * self.n
    }

    /// Stream function for the given vorticity.
    pub fn solve(&self, omega: &DVector<f64>) -> SolverResult<DVector<f64>> {
        if omega.len() != self.dim() {
            return Err(SolverError::Dimension {
                what: "vorticity",
                expected: self.dim(),
                actual: omega.len(),
            });
        }
        let timer = Timer::start();

        let mut buf: Vec<Complex64> = omega.iter().map(|&w| Complex64::new(w, 0.0)).collect();
        self.transform_2d(&mut buf, &self.forward);

        for (v, &k2) in buf.iter_mut().zip(&self.k_squared) {
            *v = -*v / k2;
        }

        self.transform_2d(&mut buf, &self.inverse);
        let norm = 1.0 / self.dim() as f64;
        let psi = DVector::from_iterator(self.dim(), buf.iter().map(|c| c.re * norm));

        timer.stop_into(&solver_timing::POISSON_SOLVES);
        Ok(psi)
    }

    /// Unnormalized 2D transform: every row, then every column.
    fn transform_2d(&self, buf: &mut [Complex64], plan: &Arc<dyn Fft<f64>>) {
        // The buffer holds n rows back to back, so one call covers all of them.
        plan.process(buf);
        transpose_square(buf, self.n);
        plan.process(buf);
        transpose_square(buf, self.n);
    }
}

impl fmt::Debug for SpectralPoisson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralPoisson").field("n", &self.n).finish()
    }
}

fn transpose_square(buf: &mut [Complex64], n: usize) {
    for i in 0..n {
        for j in (i + 1)..n {
            buf.swap(i * n + j, j * n + i);
        }
    }
}

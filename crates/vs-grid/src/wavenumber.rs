//! Angular wavenumbers for the spectral Poisson solve.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::error::{GridError, GridResult};
use crate::grid::Grid;

/// Value substituted for the zero wavenumber so `kx^2 + ky^2` never vanishes.
pub const DEFAULT_ZERO_MODE_TOL: f64 = 1e-6;

/// `kx`, `ky` meshes in FFT order, scaled by `pi / endpt`.
#[derive(Clone, Debug)]
pub struct WavenumberMesh {
    k: Vec<f64>,
    kx: DMatrix<f64>,
    ky: DMatrix<f64>,
    k_squared: DMatrix<f64>,
}

impl WavenumberMesh {
    pub fn build(grid: &Grid, tol: f64) -> GridResult<Self> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(GridError::InvalidGrid {
                what: format!("zero-mode tolerance must be positive and finite, got {tol}"),
            });
        }
        if !(2.0 * tol * tol).is_normal() {
            return Err(GridError::InvalidGrid {
                what: format!("zero-mode tolerance {tol} underflows when squared"),
            });
        }

        let n = grid.n();
        let half = n / 2;
        let scale = PI / grid.endpt();

        // -n/2 .. n/2-1 rotated so index 0 is the zero mode and n/2 holds -n/2.
        let mut k: Vec<f64> = (0..n)
            .map(|m| {
                let wave = if m < half {
                    m as i64
                } else {
                    m as i64 - n as i64
                };
                scale * wave as f64
            })
            .collect();
        k[0] = tol;

        let kx = DMatrix::from_fn(n, n, |_, j| k[j]);
        let ky = DMatrix::from_fn(n, n, |i, _| k[i]);
        let k_squared = kx.component_mul(&kx) + ky.component_mul(&ky);

        Ok(Self {
            k,
            kx,
            ky,
            k_squared,
        })
    }

    /// The 1D sequence both meshes are replicated from.
    pub fn sequence(&self) -> &[f64] {
        &self.k
    }

    pub fn kx(&self) -> &DMatrix<f64> {
        &self.kx
    }

    pub fn ky(&self) -> &DMatrix<f64> {
        &self.ky
    }

    /// `kx^2 + ky^2`, the spectral symbol of the negated Laplacian.
    pub fn k_squared(&self) -> &DMatrix<f64> {
        &self.k_squared
    }
}

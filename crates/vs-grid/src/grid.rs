//! Uniform periodic grid on `[-endpt, endpt)^2`.

use nalgebra::{DMatrix, DVector};

use crate::error::{GridError, GridResult};

/// Square periodic grid with `n` points per axis.
///
/// The right/top boundary sample is excluded because it coincides with the
/// left/bottom one under periodicity.
#[derive(Clone, Debug)]
pub struct Grid {
    n: usize,
    endpt: f64,
    delta: f64,
    coords: Vec<f64>,
}

impl Grid {
    /// Smallest accepted resolution exponent (`n = 4`).
    pub const MIN_FACTOR: u32 = 2;
    /// Largest accepted resolution exponent (`n = 256`).
    pub const MAX_FACTOR: u32 = 8;

    pub fn new(n: usize, endpt: f64) -> GridResult<Self> {
        if n < 1 {
            return Err(GridError::InvalidGrid {
                what: "resolution must be at least 1".to_string(),
            });
        }
        if !n.is_power_of_two() {
            return Err(GridError::InvalidGrid {
                what: format!("resolution {n} is not a power of two"),
            });
        }
        if !endpt.is_finite() || endpt <= 0.0 {
            return Err(GridError::InvalidGrid {
                what: format!("domain half-width must be positive and finite, got {endpt}"),
            });
        }

        let delta = 2.0 * endpt / n as f64;
        let coords = (0..n).map(|j| -endpt + j as f64 * delta).collect();

        Ok(Self {
            n,
            endpt,
            delta,
            coords,
        })
    }

    /// Build a grid with `n = 2^n_factor`.
    pub fn from_factor(n_factor: u32, endpt: f64) -> GridResult<Self> {
        if !(Self::MIN_FACTOR..=Self::MAX_FACTOR).contains(&n_factor) {
            return Err(GridError::InvalidGrid {
                what: format!(
                    "resolution factor {n_factor} outside {}..={}",
                    Self::MIN_FACTOR,
                    Self::MAX_FACTOR
                ),
            });
        }
        Self::new(1usize << n_factor, endpt)
    }

    /// Points per axis.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn endpt(&self) -> f64 {
        self.endpt
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Length of a flattened field, `n^2`.
    pub fn point_count(&self) -> usize {
        self.n * self.n
    }

    /// 1D sample positions shared by both axes.
    pub fn coordinates(&self) -> &[f64] {
        &self.coords
    }

    /// `x_mesh[(i, j)] = coords[j]`.
    pub fn x_mesh(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n, self.n, |_, j| self.coords[j])
    }

    /// `y_mesh[(i, j)] = coords[i]`.
    pub fn y_mesh(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n, self.n, |i, _| self.coords[i])
    }

    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Periodic successor along an axis.
    pub fn wrap_next(&self, i: usize) -> usize {
        (i + 1) % self.n
    }

    /// Periodic predecessor along an axis.
    pub fn wrap_prev(&self, i: usize) -> usize {
        (i + self.n - 1) % self.n
    }

    /// Evaluate `f(x, y)` at every grid point, flattened row-major.
    pub fn sample<F>(&self, f: F) -> DVector<f64>
    where
        F: Fn(f64, f64) -> f64,
    {
        let n = self.n;
        DVector::from_fn(n * n, |k, _| f(self.coords[k % n], self.coords[k / n]))
    }

    /// Reshape a flattened field back to `n x n`.
    pub fn reshape(&self, field: &DVector<f64>) -> GridResult<DMatrix<f64>> {
        self.check_len(field.len(), "field")?;
        Ok(DMatrix::from_row_slice(self.n, self.n, field.as_slice()))
    }

    /// Flatten an `n x n` field row-major.
    pub fn flatten(&self, field: &DMatrix<f64>) -> GridResult<DVector<f64>> {
        if field.nrows() != self.n || field.ncols() != self.n {
            return Err(GridError::DimensionMismatch {
                what: "matrix field",
                expected: self.n,
                actual: field.nrows().max(field.ncols()),
            });
        }
        Ok(DVector::from_iterator(
            self.point_count(),
            field.transpose().iter().copied(),
        ))
    }

    pub(crate) fn check_len(&self, len: usize, what: &'static str) -> GridResult<()> {
        if len != self.point_count() {
            return Err(GridError::DimensionMismatch {
                what,
                expected: self.point_count(),
                actual: len,
            });
        }
        Ok(())
    }
}

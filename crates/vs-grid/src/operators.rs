//! Sparse periodic finite-difference operators.

use nalgebra::DVector;

use crate::error::{GridError, GridResult};
use crate::grid::Grid;

/// Square sparse matrix in compressed-row form.
#[derive(Clone, Debug)]
pub struct SparseOperator {
    dim: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseOperator {
    /// Assemble from `(row, col, value)` triplets. Repeated positions are
    /// summed and entries that cancel to exactly zero are dropped.
    pub fn from_triplets(dim: usize, mut triplets: Vec<(usize, usize, f64)>) -> GridResult<Self> {
        if let Some(&(r, c, _)) = triplets.iter().find(|(r, c, _)| *r >= dim || *c >= dim) {
            return Err(GridError::DimensionMismatch {
                what: "triplet index",
                expected: dim,
                actual: r.max(c),
            });
        }
        triplets.sort_by_key(|&(r, c, _)| (r, c));

        let mut merged: Vec<(usize, usize, f64)> = Vec::with_capacity(triplets.len());
        for (r, c, v) in triplets {
            match merged.last_mut() {
                Some(last) if last.0 == r && last.1 == c => last.2 += v,
                _ => merged.push((r, c, v)),
            }
        }
        merged.retain(|&(_, _, v)| v != 0.0);

        let mut row_ptr = vec![0; dim + 1];
        for &(r, _, _) in &merged {
            row_ptr[r + 1] += 1;
        }
        for r in 0..dim {
            row_ptr[r + 1] += row_ptr[r];
        }

        let (col_idx, values): (Vec<usize>, Vec<f64>) =
            merged.into_iter().map(|(_, c, v)| (c, v)).unzip();
        Ok(Self {
            dim,
            row_ptr,
            col_idx,
            values,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Entry at `(row, col)`, zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.dim {
            return 0.0;
        }
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.col_idx[span.clone()].binary_search(&col) {
            Ok(pos) => self.values[span.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Stored `(col, value)` pairs of one row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }

    /// Matrix-vector product.
    pub fn apply(&self, x: &DVector<f64>) -> GridResult<DVector<f64>> {
        if x.len() != self.dim {
            return Err(GridError::DimensionMismatch {
                what: "operator input",
                expected: self.dim,
                actual: x.len(),
            });
        }
        let mut y = DVector::zeros(self.dim);
        for r in 0..self.dim {
            let mut acc = 0.0;
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                acc += self.values[k] * x[self.col_idx[k]];
            }
            y[r] = acc;
        }
        Ok(y)
    }

    /// Multiply a single stored entry in place; no-op when it is not stored.
    pub fn scale_entry(&mut self, row: usize, col: usize, factor: f64) {
        if row >= self.dim {
            return;
        }
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        if let Ok(pos) = self.col_idx[span.clone()].binary_search(&col) {
            self.values[span.start + pos] *= factor;
        }
    }
}

/// Centered first differences and the 5-point Laplacian, all periodic.
///
/// `dx` differences along axis 0 of the flattened field (stride `n`), `dy`
/// along axis 1 (stride 1). This pairing is what the transport term
/// `dx(psi) * dy(omega) - dy(psi) * dx(omega)` is written against.
#[derive(Clone, Debug)]
pub struct PeriodicOperators {
    pub dx: SparseOperator,
    pub dy: SparseOperator,
    pub lap: SparseOperator,
}

impl PeriodicOperators {
    pub fn build(grid: &Grid) -> GridResult<Self> {
        Self::from_parts(grid.n(), grid.delta())
    }

    pub fn from_parts(n: usize, delta: f64) -> GridResult<Self> {
        if n == 0 {
            return Err(GridError::InvalidGrid {
                what: "operator resolution must be at least 1".to_string(),
            });
        }
        if !delta.is_finite() || delta <= 0.0 {
            return Err(GridError::InvalidGrid {
                what: format!("grid spacing must be positive and finite, got {delta}"),
            });
        }

        let dim = n * n;
        let idx = |i: usize, j: usize| i * n + j;
        let next = |i: usize| (i + 1) % n;
        let prev = |i: usize| (i + n - 1) % n;

        let half = 0.5 / delta;
        let inv_d2 = 1.0 / (delta * delta);

        let mut dx = Vec::with_capacity(2 * dim);
        let mut dy = Vec::with_capacity(2 * dim);
        let mut lap = Vec::with_capacity(5 * dim);

        for i in 0..n {
            for j in 0..n {
                let k = idx(i, j);

                dx.push((k, idx(next(i), j), half));
                dx.push((k, idx(prev(i), j), -half));

                dy.push((k, idx(i, next(j)), half));
                dy.push((k, idx(i, prev(j)), -half));

                lap.push((k, k, -4.0 * inv_d2));
                lap.push((k, idx(next(i), j), inv_d2));
                lap.push((k, idx(prev(i), j), inv_d2));
                lap.push((k, idx(i, next(j)), inv_d2));
                lap.push((k, idx(i, prev(j)), inv_d2));
            }
        }

        let mut lap = SparseOperator::from_triplets(dim, lap)?;
        // Mean-mode correction paired with the perturbed zero wavenumber.
        // Halved, not negated: the entry stays -2/delta^2.
        lap.scale_entry(0, 0, 0.5);

        tracing::debug!(n, delta, lap_nnz = lap.nnz(), "built periodic operators");

        Ok(Self {
            dx: SparseOperator::from_triplets(dim, dx)?,
            dy: SparseOperator::from_triplets(dim, dy)?,
            lap,
        })
    }
}

//! Initial vorticity fields built from elliptical Gaussian blobs.

use nalgebra::DVector;
use vs_grid::Grid;

use crate::error::{SolverError, SolverResult};

/// One elliptical Gaussian vortex.
///
/// The scales are widths in the exponent. A negative value on either scale
/// flips the blob to negative vorticity; the magnitude is always used as the
/// width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VortexBlob {
    pub x_shift: f64,
    pub y_shift: f64,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl VortexBlob {
    /// Validated constructor.
    pub fn new(x_shift: f64, y_shift: f64, x_scale: f64, y_scale: f64) -> SolverResult<Self> {
        let blob = Self::unchecked(x_shift, y_shift, x_scale, y_scale);
        blob.validate(0)?;
        Ok(blob)
    }

    /// Constructor for values that were already validated upstream.
    pub const fn unchecked(x_shift: f64, y_shift: f64, x_scale: f64, y_scale: f64) -> Self {
        Self {
            x_shift,
            y_shift,
            x_scale,
            y_scale,
        }
    }

    /// `[x_shift, y_shift, x_scale, y_scale]`, the external 4-tuple layout.
    pub fn from_array(values: [f64; 4]) -> SolverResult<Self> {
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x_shift, self.y_shift, self.x_scale, self.y_scale]
    }

    /// Check the blob at position `index` of a list.
    pub fn validate(&self, index: usize) -> SolverResult<()> {
        if !self.x_shift.is_finite() || !self.y_shift.is_finite() {
            return Err(SolverError::InvalidBlobSpec {
                index,
                what: "shift must be finite".to_string(),
            });
        }
        for (name, scale) in [("x_scale", self.x_scale), ("y_scale", self.y_scale)] {
            if scale == 0.0 || !scale.is_finite() {
                return Err(SolverError::InvalidBlobSpec {
                    index,
                    what: format!("{name} must be nonzero and finite, got {scale}"),
                });
            }
        }
        Ok(())
    }

    /// -1 when either scale is negative, +1 otherwise.
    pub fn sign(&self) -> f64 {
        if self.x_scale < 0.0 || self.y_scale < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Unsigned Gaussian profile at `(x, y)`.
    pub fn profile(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x_shift;
        let dy = y - self.y_shift;
        (-(dx * dx) / self.x_scale.abs() - (dy * dy) / self.y_scale.abs()).exp()
    }

    /// Signed contribution at `(x, y)`.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.sign() * self.profile(x, y)
    }
}

/// Source of the vorticity field at the first requested time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InitialCondition {
    /// Two co-rotating pairs of opposite sign on the diagonals.
    #[default]
    Analytic,
    /// Superposition of user-supplied blobs, in order.
    Blobs(Vec<VortexBlob>),
}

const ANALYTIC_POSITIVE: [VortexBlob; 2] = [
    VortexBlob::unchecked(-2.0, -2.0, 1.0, 1.0),
    VortexBlob::unchecked(2.0, 2.0, 1.0, 1.0),
];
const ANALYTIC_NEGATIVE: [VortexBlob; 2] = [
    VortexBlob::unchecked(-2.0, 2.0, 1.0, 1.0),
    VortexBlob::unchecked(2.0, -2.0, 1.0, 1.0),
];

impl InitialCondition {
    /// Validate every blob and wrap them.
    pub fn blobs(blobs: Vec<VortexBlob>) -> SolverResult<Self> {
        for (index, blob) in blobs.iter().enumerate() {
            blob.validate(index)?;
        }
        Ok(Self::Blobs(blobs))
    }

    /// Evaluate on the grid, flattened row-major.
    pub fn synthesize(&self, grid: &Grid) -> DVector<f64> {
        match self {
            Self::Analytic => grid.sample(|x, y| {
                ANALYTIC_POSITIVE[0].profile(x, y) + ANALYTIC_POSITIVE[1].profile(x, y)
                    - ANALYTIC_NEGATIVE[0].profile(x, y)
                    - ANALYTIC_NEGATIVE[1].profile(x, y)
            }),
            Self::Blobs(blobs) => {
                let mut field = DVector::zeros(grid.point_count());
                for blob in blobs {
                    let contribution = grid.sample(|x, y| blob.profile(x, y));
                    if blob.sign() < 0.0 {
                        field -= contribution;
                    } else {
                        field += contribution;
                    }
                }
                field
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_scale_rejected_with_index() {
        let bad = vec![
            VortexBlob::unchecked(0.0, 0.0, 1.0, 1.0),
            VortexBlob::unchecked(0.0, 0.0, 0.0, 1.0),
        ];
        match InitialCondition::blobs(bad) {
            Err(SolverError::InvalidBlobSpec { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidBlobSpec, got {other:?}"),
        }
        assert!(VortexBlob::new(0.0, 0.0, 1.0, -0.0).is_err());
        assert!(VortexBlob::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn negative_scale_is_not_an_error() {
        let blob = VortexBlob::new(1.0, -1.0, -2.0, 3.0).unwrap();
        assert_eq!(blob.sign(), -1.0);
        assert_eq!(blob.to_array(), [1.0, -1.0, -2.0, 3.0]);
    }

    #[test]
    fn profile_peaks_at_center() {
        let blob = VortexBlob::unchecked(1.5, -0.5, 2.0, 0.5);
        assert_eq!(blob.profile(1.5, -0.5), 1.0);
        let off = blob.profile(2.5, 0.0);
        assert!((off - (-(1.0 / 2.0) - 0.25 / 0.5_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn analytic_field_is_antisymmetric_across_axes() {
        let grid = Grid::new(16, 10.0).unwrap();
        let field = InitialCondition::Analytic.synthesize(&grid);
        let n = grid.n();
        // Mirror x -> -x maps column j to (n - j) mod n on this grid.
        for i in 0..n {
            for j in 1..n {
                let a = field[grid.flat_index(i, j)];
                let b = field[grid.flat_index(i, n - j)];
                assert!((a + b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn empty_blob_list_is_quiescent() {
        let grid = Grid::new(4, 1.0).unwrap();
        let field = InitialCondition::Blobs(Vec::new()).synthesize(&grid);
        assert!(field.iter().all(|v| *v == 0.0));
    }
}

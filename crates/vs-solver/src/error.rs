//! Error types for the vorticity physics.

use thiserror::Error;
use vs_core::VsError;
use vs_grid::GridError;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid blob specification #{index}: {what}")]
    InvalidBlobSpec { index: usize, what: String },

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite value in {what} at index {index}: {value}")]
    NonFinite {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<VsError> for SolverError {
    fn from(e: VsError) -> Self {
        match e {
            VsError::NonFinite { what, index, value } => {
                SolverError::NonFinite { what, index, value }
            }
            other => SolverError::InvalidParameter {
                what: other.to_string(),
            },
        }
    }
}

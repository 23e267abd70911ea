//! Error types for grid and operator construction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid grid: {what}")]
    InvalidGrid { what: String },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type GridResult<T> = Result<T, GridError>;

impl From<GridError> for vs_core::VsError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::InvalidGrid { .. } => vs_core::VsError::InvalidArg { what: "grid" },
            GridError::DimensionMismatch { .. } => vs_core::VsError::Invariant {
                what: "operator dimension",
            },
        }
    }
}

//! Periodic grid, finite-difference operators and spectral wavenumbers.
//!
//! Everything here is built once per run and shared read-only by the
//! right-hand-side evaluator. Fields are flattened row-major: entry `(i, j)`
//! of an `n x n` field lives at `i * n + j`.

pub mod error;
pub mod grid;
pub mod operators;
pub mod wavenumber;

pub use error::{GridError, GridResult};
pub use grid::Grid;
pub use operators::{PeriodicOperators, SparseOperator};
pub use wavenumber::{DEFAULT_ZERO_MODE_TOL, WavenumberMesh};

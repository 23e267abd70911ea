//! Vorticity-stream function physics on the periodic grid.
//!
//! This crate provides:
//! - Initial vorticity synthesis from elliptical Gaussian blobs
//! - The spectral Poisson solve recovering the stream function
//! - The advection-diffusion right-hand side `d(omega)/dt`

pub mod error;
pub mod initial;
pub mod poisson;
pub mod rhs;

pub use error::{SolverError, SolverResult};
pub use initial::{InitialCondition, VortexBlob};
pub use poisson::SpectralPoisson;
pub use rhs::{DEFAULT_VISCOSITY, VorticityRhs};

//! Time integration for the vorticity transport equation.
//!
//! Provides:
//! - The `TransientModel` trait: an autonomous or time-dependent `dx/dt = f(t, x)`
//! - Dormand-Prince 5(4) steps with a 4th-order continuous extension
//! - `run_sim`: adaptive stepping with output at exactly the requested times
//! - `VorticityModel`: the vorticity right-hand side bound to an initial field

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod vorticity;

pub use error::{SimError, SimResult};
pub use integrator::{DenseSegment, DormandPrince45, StepAttempt};
pub use model::TransientModel;
pub use sim::{SimOptions, SimProgress, SimRecord, SimStats, run_sim, run_sim_with_progress};
pub use vorticity::VorticityModel;

//! Error types for time integration.

use thiserror::Error;

/// Errors encountered during time integration.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Integration failed at t = {t_reached}: {reason}")]
    IntegrationFailure { t_reached: f64, reason: String },

    #[error("Non-finite state at t = {t}: {what}")]
    NonFinite { t: f64, what: &'static str },

    #[error("Right-hand side error: {0}")]
    Solver(#[from] vs_solver::SolverError),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Furthest time successfully reached, for failures that carry one.
    pub fn t_reached(&self) -> Option<f64> {
        match self {
            SimError::IntegrationFailure { t_reached, .. } => Some(*t_reached),
            SimError::NonFinite { t, .. } => Some(*t),
            _ => None,
        }
    }
}

impl From<vs_grid::GridError> for SimError {
    fn from(e: vs_grid::GridError) -> Self {
        SimError::Solver(e.into())
    }
}

impl From<vs_core::VsError> for SimError {
    fn from(e: vs_core::VsError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

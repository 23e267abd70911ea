//! Error types for the vs-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates for every front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Invalid initial condition: {0}")]
    InitialCondition(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Integration failed at t = {t_reached}: {reason}")]
    IntegrationFailure { t_reached: f64, reason: String },

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vs-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<vs_project::ProjectError> for AppError {
    fn from(err: vs_project::ProjectError) -> Self {
        match err {
            vs_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<vs_project::ValidationError> for AppError {
    fn from(err: vs_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<vs_grid::GridError> for AppError {
    fn from(err: vs_grid::GridError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<vs_solver::SolverError> for AppError {
    fn from(err: vs_solver::SolverError) -> Self {
        match err {
            vs_solver::SolverError::InvalidBlobSpec { .. } => {
                AppError::InitialCondition(err.to_string())
            }
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<vs_sim::SimError> for AppError {
    fn from(err: vs_sim::SimError) -> Self {
        match err {
            vs_sim::SimError::IntegrationFailure { t_reached, reason } => {
                AppError::IntegrationFailure { t_reached, reason }
            }
            other => AppError::Simulation(other.to_string()),
        }
    }
}

impl From<vs_results::ResultsError> for AppError {
    fn from(err: vs_results::ResultsError) -> Self {
        match err {
            vs_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

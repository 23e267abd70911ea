//! Shared application service layer for vortstream.
//!
//! Centralizes configuration handling, run execution with caching, and
//! queries over stored vorticity frames so front ends stay thin.

pub mod config_service;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;

pub use config_service::{
    ConfigSummary, load_config, resolve_initial_condition, save_config, summarize_config,
    validate_config,
};
pub use error::{AppError, AppResult};
pub use progress::{IntegrationProgress, RunProgressEvent, RunStage};
pub use query::{
    FieldDiagnostics, RunSummary, diagnostics_series, frame_diagnostics, frame_to_csv, get_frame,
    get_run_summary,
};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, SOLVER_VERSION, SolutionSeries, ensure_run,
    ensure_run_with_progress, list_runs, load_run, load_series, solve_config,
    solve_config_with_progress,
};

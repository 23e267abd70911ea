//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};
use vs_core::Tolerances;
use vs_core::timing::{PerfStats, solver_timing};
use vs_grid::Grid;
use vs_project::RunConfig;
use vs_results::{
    FrameRecord, IntegrationStats, MeshRecord, RunManifest, RunStore, compute_run_id,
};
use vs_sim::{SimOptions, SimProgress, VorticityModel, run_sim_with_progress};

use crate::config_service;
use crate::error::{AppError, AppResult};
use crate::progress::{IntegrationProgress, RunProgressEvent, RunStage};

/// Tag stored with every run; changing it invalidates cached results.
pub const SOLVER_VERSION: &str = concat!("vortstream-", env!("CARGO_PKG_VERSION"));

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub config_path: &'a Path,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: PerfStats,
    pub total_time_s: f64,
}

/// Vorticity at every requested time, with the meshes to plot it on.
#[derive(Debug, Clone)]
pub struct SolutionSeries {
    pub times: Vec<f64>,
    /// Flattened row-major `n x n` fields, one per time.
    pub frames: Vec<DVector<f64>>,
    pub x_mesh: DMatrix<f64>,
    pub y_mesh: DMatrix<f64>,
    pub stats: IntegrationStats,
}

impl SolutionSeries {
    pub fn n(&self) -> usize {
        self.x_mesh.nrows()
    }

    /// Frame `index` as an `n x n` matrix.
    pub fn frame_matrix(&self, index: usize) -> AppResult<DMatrix<f64>> {
        let frame = self.frames.get(index).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "frame index {index} out of range (0..{})",
                self.frames.len()
            ))
        })?;
        let n = self.n();
        Ok(DMatrix::from_row_slice(n, n, frame.as_slice()))
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Integrate a config in memory, without touching the store.
pub fn solve_config(config: &RunConfig) -> AppResult<SolutionSeries> {
    solve_config_with_progress(config, None)
}

/// [`solve_config`] with integrator progress.
pub fn solve_config_with_progress(
    config: &RunConfig,
    progress: Option<&mut dyn FnMut(&SimProgress)>,
) -> AppResult<SolutionSeries> {
    let (grid, model) = build_model(config)?;
    integrate(config, &grid, &model, progress)
}

fn build_model(config: &RunConfig) -> AppResult<(Grid, VorticityModel)> {
    config_service::validate_config(config)?;
    let ic = config_service::resolve_initial_condition(config)?;
    let grid = Grid::from_factor(config.n_factor, config.endpt)?;
    let model = VorticityModel::from_grid(&grid, &ic, config.nu, config.tol)?;
    debug!(n = grid.n(), delta = grid.delta(), "operators built");
    Ok((grid, model))
}

fn integrate(
    config: &RunConfig,
    grid: &Grid,
    model: &VorticityModel,
    progress: Option<&mut dyn FnMut(&SimProgress)>,
) -> AppResult<SolutionSeries> {
    let tol = Tolerances::uniform(config.tol);
    let opts = SimOptions {
        rtol: tol.rel,
        atol: tol.abs,
        ..SimOptions::default()
    };
    let times = config.times();

    let record = run_sim_with_progress(model, &times, &opts, progress).inspect_err(|e| {
        warn!(error = %e, "integration failed");
    })?;

    Ok(SolutionSeries {
        times: record.t,
        frames: record.x,
        x_mesh: grid.x_mesh(),
        y_mesh: grid.y_mesh(),
        stats: IntegrationStats {
            accepted_steps: record.stats.accepted_steps,
            rejected_steps: record.stats.rejected_steps,
            rhs_evals: record.stats.rhs_evals,
        },
    })
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = PerfStats::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingConfig,
        started,
        Some(format!("Loading {}", request.config_path.display())),
    );
    let config = config_service::load_config(request.config_path)?;

    let store = RunStore::for_config(request.config_path)?;
    let run_id = compute_run_id(&config, &request.options.solver_version)?;

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some(format!("Run id {}", short_id(&run_id))),
    );

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            None,
        );
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_time_s = load_started.elapsed().as_secs_f64();
        timing.accepted_steps = manifest.stats.accepted_steps;
        timing.rejected_steps = manifest.stats.rejected_steps;
        timing.rhs_evals = manifest.stats.rhs_evals;

        info!(run_id = %run_id, "loaded cached run");
        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded from cache".to_string()),
        );
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
            total_time_s: started.elapsed().as_secs_f64(),
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::BuildingOperators,
        started,
        Some(format!("Building {0}x{0} operators", config.n())),
    );
    solver_timing::reset_all();
    let build_started = Instant::now();
    let (grid, model) = build_model(&config)?;
    timing.build_time_s = build_started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::Integrating,
        started,
        Some(format!("Integrating {} output times", config.time_length)),
    );
    info!(run_id = %run_id, n = grid.n(), time_length = config.time_length, "starting run");

    let integrate_started = Instant::now();
    let series = {
        let mut forward = |p: &SimProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    stage: RunStage::Integrating,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    integration: Some(IntegrationProgress::from(p)),
                });
            }
        };
        integrate(&config, &grid, &model, Some(&mut forward))?
    };
    timing.integrate_time_s = integrate_started.elapsed().as_secs_f64();
    timing.accepted_steps = series.stats.accepted_steps;
    timing.rejected_steps = series.stats.rejected_steps;
    timing.rhs_evals = series.stats.rhs_evals;

    let manifest = RunManifest {
        run_id: run_id.clone(),
        config_name: config.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: request.options.solver_version.clone(),
        n: grid.n(),
        endpt: grid.endpt(),
        nu: config.nu,
        tol: config.tol,
        time_length: config.time_length,
        stats: series.stats,
    };

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving run output".to_string()),
    );
    let save_started = Instant::now();
    let frames = series_to_frames(&series);
    store.save_run(&manifest, &frames, &mesh_record(&grid))?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();

    timing.log_summary();
    info!(
        run_id = %run_id,
        accepted = timing.accepted_steps,
        rejected = timing.rejected_steps,
        "run complete"
    );
    emit_progress(&mut progress_cb, RunStage::Completed, started, None);

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
        total_time_s: started.elapsed().as_secs_f64(),
    })
}

fn short_id(run_id: &str) -> &str {
    &run_id[..run_id.len().min(12)]
}

fn series_to_frames(series: &SolutionSeries) -> Vec<FrameRecord> {
    series
        .times
        .iter()
        .zip(&series.frames)
        .map(|(&time, omega)| FrameRecord {
            time,
            omega: omega.as_slice().to_vec(),
        })
        .collect()
}

fn mesh_record(grid: &Grid) -> MeshRecord {
    let rows = |m: DMatrix<f64>| -> Vec<Vec<f64>> {
        m.row_iter().map(|r| r.iter().copied().collect()).collect()
    };
    MeshRecord {
        n: grid.n(),
        endpt: grid.endpt(),
        x_mesh: rows(grid.x_mesh()),
        y_mesh: rows(grid.y_mesh()),
    }
}

/// Stored runs next to a config file, newest first.
pub fn list_runs(config_path: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_config(config_path)?;
    Ok(store.list_runs()?)
}

/// Manifest and frames of a stored run.
pub fn load_run(config_path: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<FrameRecord>)> {
    let store = RunStore::for_config(config_path)?;
    let manifest = store.load_manifest(run_id)?;
    let frames = store.load_frames(run_id)?;
    Ok((manifest, frames))
}

/// Rebuild a [`SolutionSeries`] from a stored run.
pub fn load_series(config_path: &Path, run_id: &str) -> AppResult<SolutionSeries> {
    let store = RunStore::for_config(config_path)?;
    let manifest = store.load_manifest(run_id)?;
    let frames = store.load_frames(run_id)?;
    let mesh = store.load_mesh(run_id)?;

    let n = mesh.n;
    let flatten = |rows: &[Vec<f64>], what: &str| -> AppResult<DMatrix<f64>> {
        if rows.len() != n || rows.iter().any(|r| r.len() != n) {
            return Err(AppError::Results(format!("{what} is not {n}x{n}")));
        }
        Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
    };
    let x_mesh = flatten(&mesh.x_mesh, "x mesh")?;
    let y_mesh = flatten(&mesh.y_mesh, "y mesh")?;

    let mut times = Vec::with_capacity(frames.len());
    let mut fields = Vec::with_capacity(frames.len());
    for (index, frame) in frames.into_iter().enumerate() {
        if frame.omega.len() != n * n {
            return Err(AppError::Results(format!(
                "frame {index} has {} values, expected {}",
                frame.omega.len(),
                n * n
            )));
        }
        times.push(frame.time);
        fields.push(DVector::from_vec(frame.omega));
    }

    Ok(SolutionSeries {
        times,
        frames: fields,
        x_mesh,
        y_mesh,
        stats: manifest.stats,
    })
}

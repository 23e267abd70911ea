//! Query helpers for extracting data from loaded runs.

use std::fmt::Write as _;

use vs_results::FrameRecord;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub frame_count: usize,
    pub n: usize,
    pub peak_abs_vorticity: f64,
}

/// Integral quantities of one vorticity frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDiagnostics {
    pub time: f64,
    /// `sum(omega) * delta^2`
    pub circulation: f64,
    /// `0.5 * sum(omega^2) * delta^2`
    pub enstrophy: f64,
    pub min: f64,
    pub max: f64,
}

fn side_length(frame: &FrameRecord) -> AppResult<usize> {
    let len = frame.omega.len();
    let n = (len as f64).sqrt().round() as usize;
    if n == 0 || n * n != len {
        return Err(AppError::InvalidInput(format!(
            "frame at t = {} has {len} values, not a square field",
            frame.time
        )));
    }
    Ok(n)
}

/// Get run summary from stored frames.
pub fn get_run_summary(frames: &[FrameRecord]) -> AppResult<RunSummary> {
    let (first, last) = match (frames.first(), frames.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AppError::InvalidInput("No frames in run".to_string())),
    };

    let peak_abs_vorticity = frames
        .iter()
        .flat_map(|f| f.omega.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    Ok(RunSummary {
        time_range: (first.time, last.time),
        frame_count: frames.len(),
        n: side_length(first)?,
        peak_abs_vorticity,
    })
}

/// Frame at `index`, with a readable error when out of range.
pub fn get_frame(frames: &[FrameRecord], index: usize) -> AppResult<&FrameRecord> {
    frames.get(index).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "frame index {index} out of range (0..{})",
            frames.len()
        ))
    })
}

/// `n` comma-separated rows of `n` values, row `i` holding `omega[i][..]`.
pub fn frame_to_csv(frame: &FrameRecord) -> AppResult<String> {
    let n = side_length(frame)?;
    let mut out = String::with_capacity(frame.omega.len() * 24);
    for row in frame.omega.chunks(n) {
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            let _ = write!(out, "{v:e}");
        }
        out.push('\n');
    }
    Ok(out)
}

/// Circulation, enstrophy and extrema of a frame on a grid of spacing `delta`.
pub fn frame_diagnostics(frame: &FrameRecord, delta: f64) -> AppResult<FieldDiagnostics> {
    side_length(frame)?;
    let cell = delta * delta;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in &frame.omega {
        sum += v;
        sum_sq += v * v;
        min = min.min(v);
        max = max.max(v);
    }
    Ok(FieldDiagnostics {
        time: frame.time,
        circulation: sum * cell,
        enstrophy: 0.5 * sum_sq * cell,
        min,
        max,
    })
}

/// [`frame_diagnostics`] for every frame.
pub fn diagnostics_series(frames: &[FrameRecord], delta: f64) -> AppResult<Vec<FieldDiagnostics>> {
    frames.iter().map(|f| frame_diagnostics(f, delta)).collect()
}

//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub config_name: String,
    /// RFC 3339.
    pub timestamp: String,
    pub solver_version: String,
    pub n: usize,
    pub endpt: f64,
    pub nu: f64,
    pub tol: f64,
    pub time_length: usize,
    #[serde(default)]
    pub stats: IntegrationStats,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evals: usize,
}

/// One output time. `omega` is the flattened row-major `n x n` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameRecord {
    pub time: f64,
    pub omega: Vec<f64>,
}

/// Coordinate meshes for rendering, `x[i][j]` and `y[i][j]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeshRecord {
    pub n: usize,
    pub endpt: f64,
    pub x_mesh: Vec<Vec<f64>>,
    pub y_mesh: Vec<Vec<f64>>,
}

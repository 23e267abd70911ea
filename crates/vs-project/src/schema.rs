//! Run configuration schema.

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

/// Everything needed to reproduce one vorticity run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    /// Grid has `2^n_factor` points per axis.
    #[serde(default = "default_n_factor")]
    pub n_factor: u32,
    /// Half-width of the square domain.
    #[serde(default = "default_endpt")]
    pub endpt: f64,
    /// Number of output times, `0, 1, ..., time_length - 1`.
    #[serde(default = "default_time_length")]
    pub time_length: usize,
    /// Kinematic viscosity.
    #[serde(default = "default_nu")]
    pub nu: f64,
    /// Integrator tolerances and zero-wavenumber substitute.
    #[serde(default = "default_tol")]
    pub tol: f64,
    #[serde(default)]
    pub initial_conditions: BlobSource,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: default_name(),
            n_factor: default_n_factor(),
            endpt: default_endpt(),
            time_length: default_time_length(),
            nu: default_nu(),
            tol: default_tol(),
            initial_conditions: BlobSource::default(),
        }
    }
}

impl RunConfig {
    /// Points per axis.
    pub fn n(&self) -> usize {
        1usize << self.n_factor
    }

    /// Requested output times.
    pub fn times(&self) -> Vec<f64> {
        (0..self.time_length).map(|t| t as f64).collect()
    }
}

fn default_version() -> u32 {
    LATEST_VERSION
}

fn default_name() -> String {
    "vortstream run".to_string()
}

fn default_n_factor() -> u32 {
    4
}

fn default_endpt() -> f64 {
    10.0
}

fn default_time_length() -> usize {
    100
}

fn default_nu() -> f64 {
    0.001
}

fn default_tol() -> f64 {
    1e-6
}

/// Where the starting vorticity comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlobSource {
    /// Fixed four-blob arrangement.
    #[default]
    Analytic,
    Custom {
        #[serde(default)]
        blobs: Vec<BlobDef>,
    },
    /// `count` blobs drawn from a seeded generator.
    Random { count: usize, seed: u64 },
}

/// One Gaussian blob. A negative scale makes the blob negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlobDef {
    pub x_shift: f64,
    pub y_shift: f64,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl BlobDef {
    pub fn new(x_shift: f64, y_shift: f64, x_scale: f64, y_scale: f64) -> Self {
        Self {
            x_shift,
            y_shift,
            x_scale,
            y_scale,
        }
    }
}

impl From<[f64; 4]> for BlobDef {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

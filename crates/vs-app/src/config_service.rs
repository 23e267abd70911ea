//! Run configuration loading, saving, validation and blob resolution.

use std::path::Path;

use vs_project::{BlobDef, BlobSource, RunConfig, random_blobs};
use vs_solver::{InitialCondition, VortexBlob};

use crate::error::{AppError, AppResult};

/// Summary of a configuration for listing.
#[derive(Debug, Clone)]
pub struct ConfigSummary {
    pub name: String,
    pub n: usize,
    pub endpt: f64,
    pub delta: f64,
    pub time_length: usize,
    pub nu: f64,
    pub tol: f64,
    pub blob_source: &'static str,
    pub blob_count: usize,
}

/// Load and validate a YAML or JSON config file.
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    if !path.exists() {
        return Err(AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(vs_project::load_config(path)?)
}

/// Validate and write a config file, format chosen by extension.
pub fn save_config(path: &Path, config: &RunConfig) -> AppResult<()> {
    Ok(vs_project::save_config(path, config)?)
}

pub fn validate_config(config: &RunConfig) -> AppResult<()> {
    Ok(vs_project::validate_config(config)?)
}

/// Blob list the config stands for, with random sources expanded.
pub fn resolve_blobs(config: &RunConfig) -> AppResult<Option<Vec<BlobDef>>> {
    match &config.initial_conditions {
        BlobSource::Analytic => Ok(None),
        BlobSource::Custom { blobs } => Ok(Some(blobs.clone())),
        BlobSource::Random { count, seed } => {
            Ok(Some(random_blobs(*count, *seed, config.endpt)?))
        }
    }
}

/// Solver-side initial condition for a validated config.
pub fn resolve_initial_condition(config: &RunConfig) -> AppResult<InitialCondition> {
    match resolve_blobs(config)? {
        None => Ok(InitialCondition::Analytic),
        Some(defs) => {
            let blobs = defs
                .iter()
                .map(|b| VortexBlob::unchecked(b.x_shift, b.y_shift, b.x_scale, b.y_scale))
                .collect();
            Ok(InitialCondition::blobs(blobs)?)
        }
    }
}

pub fn summarize_config(config: &RunConfig) -> ConfigSummary {
    let n = config.n();
    let (blob_source, blob_count) = match &config.initial_conditions {
        BlobSource::Analytic => ("analytic", 4),
        BlobSource::Custom { blobs } => ("custom", blobs.len()),
        BlobSource::Random { count, .. } => ("random", *count),
    };
    ConfigSummary {
        name: config.name.clone(),
        n,
        endpt: config.endpt,
        delta: 2.0 * config.endpt / n as f64,
        time_length: config.time_length,
        nu: config.nu,
        tol: config.tol,
        blob_source,
        blob_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytic_resolves_to_analytic() {
        let ic = resolve_initial_condition(&RunConfig::default()).unwrap();
        assert_eq!(ic, InitialCondition::Analytic);
    }

    #[test]
    fn random_source_is_reproducible() {
        let config = RunConfig {
            initial_conditions: BlobSource::Random { count: 6, seed: 11 },
            ..RunConfig::default()
        };
        let a = resolve_initial_condition(&config).unwrap();
        let b = resolve_initial_condition(&config).unwrap();
        assert_eq!(a, b);
        match a {
            InitialCondition::Blobs(blobs) => assert_eq!(blobs.len(), 6),
            other => panic!("expected blobs, got {other:?}"),
        }
    }

    #[test]
    fn random_source_on_empty_domain_is_validation_error() {
        let config = RunConfig {
            endpt: -1.0,
            initial_conditions: BlobSource::Random { count: 1, seed: 0 },
            ..RunConfig::default()
        };
        assert!(matches!(
            resolve_initial_condition(&config),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn zero_scale_surfaces_as_initial_condition_error() {
        let config = RunConfig {
            initial_conditions: BlobSource::Custom {
                blobs: vec![BlobDef::new(0.0, 0.0, 0.0, 1.0)],
            },
            ..RunConfig::default()
        };
        assert!(matches!(
            resolve_initial_condition(&config),
            Err(AppError::InitialCondition(_))
        ));
    }

    #[test]
    fn summary_reports_grid() {
        let summary = summarize_config(&RunConfig::default());
        assert_eq!(summary.n, 16);
        assert_eq!(summary.delta, 1.25);
        assert_eq!(summary.blob_source, "analytic");
    }

    #[test]
    fn missing_file_is_read_error() {
        let path = std::env::temp_dir().join("vs_app_does_not_exist.yaml");
        assert!(matches!(
            load_config(&path),
            Err(AppError::ConfigFileRead { .. })
        ));
    }
}

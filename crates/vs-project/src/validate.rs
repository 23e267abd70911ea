//! Run configuration validation.

use vs_grid::Grid;

use crate::schema::{BlobDef, BlobSource, LATEST_VERSION, RunConfig};

/// Largest number of output times accepted.
pub const MAX_TIME_LENGTH: usize = 800;
/// Largest random blob count accepted.
pub const MAX_RANDOM_BLOBS: usize = 1000;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid blob {index}: {reason}")]
    InvalidBlob { index: usize, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub(crate) fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    if !(Grid::MIN_FACTOR..=Grid::MAX_FACTOR).contains(&config.n_factor) {
        return Err(invalid(
            "n_factor",
            config.n_factor,
            &format!("must be in {}..={}", Grid::MIN_FACTOR, Grid::MAX_FACTOR),
        ));
    }
    if !config.endpt.is_finite() || config.endpt <= 0.0 {
        return Err(invalid("endpt", config.endpt, "must be positive and finite"));
    }
    if !(2..=MAX_TIME_LENGTH).contains(&config.time_length) {
        return Err(invalid(
            "time_length",
            config.time_length,
            &format!("must be in 2..={MAX_TIME_LENGTH}"),
        ));
    }
    if !config.nu.is_finite() || config.nu < 0.0 {
        return Err(invalid("nu", config.nu, "must be non-negative and finite"));
    }
    if !config.tol.is_finite() || config.tol <= 0.0 {
        return Err(invalid("tol", config.tol, "must be positive and finite"));
    }
    if !(2.0 * config.tol * config.tol).is_normal() {
        return Err(invalid(
            "tol",
            config.tol,
            "too small to stand in for the zero wavenumber",
        ));
    }

    match &config.initial_conditions {
        BlobSource::Analytic => {}
        BlobSource::Custom { blobs } => {
            for (index, blob) in blobs.iter().enumerate() {
                validate_blob(index, blob, config.endpt)?;
            }
        }
        BlobSource::Random { count, .. } => {
            if *count > MAX_RANDOM_BLOBS {
                return Err(invalid(
                    "initial_conditions.count",
                    count,
                    &format!("must be at most {MAX_RANDOM_BLOBS}"),
                ));
            }
        }
    }

    Ok(())
}

fn validate_blob(index: usize, blob: &BlobDef, endpt: f64) -> Result<(), ValidationError> {
    for (name, shift) in [("x_shift", blob.x_shift), ("y_shift", blob.y_shift)] {
        if !shift.is_finite() || shift.abs() > endpt {
            return Err(ValidationError::InvalidBlob {
                index,
                reason: format!("{name} = {shift} lies outside [-{endpt}, {endpt}]"),
            });
        }
    }
    for (name, scale) in [("x_scale", blob.x_scale), ("y_scale", blob.y_scale)] {
        if scale == 0.0 || !scale.is_finite() {
            return Err(ValidationError::InvalidBlob {
                index,
                reason: format!("{name} must be nonzero and finite, got {scale}"),
            });
        }
    }
    Ok(())
}

//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use vs_project::RunConfig;

use crate::ResultsResult;

/// SHA-256 over the serialized configuration and the solver version.
///
/// The display name does not take part: renaming a config reuses its runs.
pub fn compute_run_id(config: &RunConfig, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let physics = RunConfig {
        name: String::new(),
        ..config.clone()
    };
    let config_json = serde_json::to_string(&physics)?;
    hasher.update(config_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

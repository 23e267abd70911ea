//! Run storage API.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};

use crate::types::{FrameRecord, MeshRecord, RunManifest};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const FRAMES_FILE: &str = "frames.jsonl";
const MESH_FILE: &str = "mesh.json";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a config file, under `.vortstream/runs/`.
    pub fn for_config(config_path: &Path) -> ResultsResult<Self> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "config path has no parent directory".to_string(),
            })?;
        let runs_dir = config_dir.join(".vortstream").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        let dir = self.run_dir(run_id);
        dir.join(MANIFEST_FILE).exists() && dir.join(FRAMES_FILE).exists()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        frames: &[FrameRecord],
        mesh: &MeshRecord,
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut frames_content = String::new();
        for frame in frames {
            let line = serde_json::to_string(frame)?;
            frames_content.push_str(&line);
            frames_content.push('\n');
        }
        fs::write(run_dir.join(FRAMES_FILE), frames_content)?;

        fs::write(run_dir.join(MESH_FILE), serde_json::to_string(mesh)?)?;

        // Written last: a manifest marks the run as complete.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_frames(&self, run_id: &str) -> ResultsResult<Vec<FrameRecord>> {
        let frames_path = self.run_dir(run_id).join(FRAMES_FILE);

        if !frames_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(frames_path)?;
        let mut frames = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let frame: FrameRecord = serde_json::from_str(line)?;
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    /// Single frame without keeping the others in memory.
    pub fn load_frame(&self, run_id: &str, index: usize) -> ResultsResult<FrameRecord> {
        let frames_path = self.run_dir(run_id).join(FRAMES_FILE);

        if !frames_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(frames_path)?;
        let line = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .nth(index)
            .ok_or_else(|| ResultsError::Corrupt {
                run_id: run_id.to_string(),
                what: format!("no frame at index {index}"),
            })?;
        Ok(serde_json::from_str(line)?)
    }

    pub fn load_mesh(&self, run_id: &str) -> ResultsResult<MeshRecord> {
        let mesh_path = self.run_dir(run_id).join(MESH_FILE);

        if !mesh_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(mesh_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Every complete run, newest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| {
            parse_timestamp(&b.timestamp)
                .cmp(&parse_timestamp(&a.timestamp))
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// Unparseable timestamps sort as oldest.
fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

//! Progress events streamed to front ends.

/// Coarse phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingConfig,
    CheckingCache,
    LoadingCachedResult,
    BuildingOperators,
    Integrating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingConfig => "loading config",
            RunStage::CheckingCache => "checking cache",
            RunStage::LoadingCachedResult => "loading cached result",
            RunStage::BuildingOperators => "building operators",
            RunStage::Integrating => "integrating",
            RunStage::SavingResults => "saving results",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegrationProgress {
    pub sim_time: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub outputs_emitted: usize,
}

impl From<&vs_sim::SimProgress> for IntegrationProgress {
    fn from(p: &vs_sim::SimProgress) -> Self {
        Self {
            sim_time: p.t,
            t_end: p.t_end,
            fraction_complete: p.fraction_complete,
            accepted_steps: p.accepted_steps,
            rejected_steps: p.rejected_steps,
            outputs_emitted: p.outputs_emitted,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub integration: Option<IntegrationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            integration: None,
        }
    }
}

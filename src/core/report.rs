//! Step outcomes and the append-only step log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Success,
    Failed,
}

/// Record of one executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Name of the step that produced this record
    pub step_name: String,

    /// Whether the step's action succeeded
    pub status: StepStatus,

    /// Diagnostic message (error text on failure, optional note on success)
    pub message: Option<String>,

    /// When the step finished
    pub timestamp: DateTime<Utc>,
}

impl StepResult {
    pub fn success(step_name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Success,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Failed,
            message: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// Append-only record of a pipeline run
///
/// Results are appended as steps finish and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepLog {
    results: Vec<StepResult>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: StepResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn find(&self, step_name: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step_name == step_name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Terminal status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// Every step was attempted (best-effort failures allowed)
    Completed,
    /// A fatal step failed and execution stopped there
    Aborted,
}

/// Result of a full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,

    /// Name of the fatal step that failed, when aborted
    pub failed_step: Option<String>,

    /// Every step outcome, in execution order
    pub log: StepLog,
}

impl PipelineResult {
    pub fn is_completed(&self) -> bool {
        self.status == PipelineStatus::Completed
    }
}

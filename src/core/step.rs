//! Step domain model

use crate::installers::InstallerError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure policy for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// A failure aborts the pipeline immediately
    Fatal,
    /// A failure is recorded and the pipeline continues
    BestEffort,
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPolicy::Fatal => write!(f, "fatal"),
            StepPolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Error produced by a step action
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Installer(#[from] InstallerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// The side-effecting operation a step wraps
///
/// Implementations invoke exactly one external collaborator (package
/// manager, installer, version-control client, runtime probe). On success
/// they may return a short human-readable message for the step log.
#[async_trait]
pub trait StepAction: Send + Sync {
    async fn run(&self) -> Result<Option<String>, StepError>;
}

/// A single step in a provisioning pipeline
///
/// Immutable once built; executed exactly once per run.
#[derive(Clone)]
pub struct Step {
    /// Human-readable step name (unique within one plan)
    pub name: String,

    /// What the step does when executed
    pub action: Arc<dyn StepAction>,

    /// Failure policy
    pub policy: StepPolicy,
}

impl Step {
    pub fn fatal(name: impl Into<String>, action: Arc<dyn StepAction>) -> Self {
        Self {
            name: name.into(),
            action,
            policy: StepPolicy::Fatal,
        }
    }

    pub fn best_effort(name: impl Into<String>, action: Arc<dyn StepAction>) -> Self {
        Self {
            name: name.into(),
            action,
            policy: StepPolicy::BestEffort,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish()
    }
}

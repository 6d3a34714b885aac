//! provision - declarative GPU environment provisioning for ComfyUI

pub mod cli;
pub mod core;
pub mod execution;
pub mod installers;
pub mod persistence;
pub mod scripts;
pub mod verify;

// Re-export commonly used types
pub use crate::core::{
    PipelineResult, PipelineStatus, PlanConfig, RepoListLoader, RepositoryEntry, Step,
    StepLog, StepPolicy, StepResult, VersionConstraintSet,
};
pub use crate::execution::{
    build_steps, Collaborators, PinEnforcer, PipelineEvent, ProvisioningPipeline,
};
pub use crate::installers::{AptClient, GitCli, InstallerError, PipClient};
pub use crate::verify::{Expectations, PythonRuntime, VerificationProbe, VerificationResult};

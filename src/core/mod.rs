//! Core domain models for provisioning
//!
//! This module defines the fundamental data structures that represent
//! plans, steps, repository lists, and version pins.

pub mod config;
pub mod pins;
pub mod report;
pub mod repos;
pub mod step;

pub use config::{AppConfig, PlanConfig, ScriptsConfig};
pub use pins::{PinError, VersionConstraintSet, VersionPin};
pub use report::{PipelineResult, PipelineStatus, StepLog, StepResult, StepStatus};
pub use repos::{ParseOutcome, ParseWarning, RepoListLoader, RepositoryEntry};
pub use step::{Step, StepAction, StepError, StepPolicy};

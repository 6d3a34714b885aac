//! Environment verification
//!
//! Confirms the provisioned stack is actually usable before the pipeline
//! declares success. The ML runtime is reached only through the
//! [`RuntimeInspector`] trait.

pub mod probe;
pub mod python;

pub use probe::{CheckOutcome, CheckStatus, Expectations, VerificationProbe, VerificationResult};
pub use python::PythonRuntime;

use crate::installers::InstallerError;
use async_trait::async_trait;

/// Accelerator device visible to the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorInfo {
    pub name: String,
    pub total_memory_mb: u64,
}

/// Introspection surface of the ML runtime under provision
#[async_trait]
pub trait RuntimeInspector: Send + Sync {
    /// Import the runtime and report its version string
    async fn runtime_version(&self) -> Result<String, InstallerError>;

    /// The accelerator the runtime sees, if any
    async fn accelerator(&self) -> Result<Option<AcceleratorInfo>, InstallerError>;

    /// Installed version of a Python package, if present
    async fn package_version(&self, package: &str)
        -> Result<Option<String>, InstallerError>;

    /// Run a minimal computation through the full stack; returns the
    /// device it ran on
    async fn smoke_test(&self) -> Result<String, InstallerError>;
}

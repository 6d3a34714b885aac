//! External collaborator interfaces
//!
//! Every side effect the pipeline performs goes through one of these
//! traits: the OS package manager, the Python package installer, and the
//! version-control client. Production implementations shell out to the
//! corresponding tools; tests substitute mocks.

pub mod apt;
pub mod git;
pub mod pip;

pub use apt::AptClient;
pub use git::GitCli;
pub use pip::PipClient;

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tracing::debug;

/// Error from invoking an external tool
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("output from {program} was not valid UTF-8")]
    InvalidOutput { program: String },
}

/// OS package manager (apt-get and friends)
#[async_trait]
pub trait SystemPackageManager: Send + Sync {
    /// Refresh the package index
    async fn update_index(&self) -> Result<(), InstallerError>;

    /// Install a list of packages non-interactively
    async fn install(&self, packages: &[String]) -> Result<(), InstallerError>;
}

/// Python package installer (pip)
#[async_trait]
pub trait PythonInstaller: Send + Sync {
    /// Install a requirements file with normal dependency resolution
    async fn install_requirements(&self, path: &Path) -> Result<(), InstallerError>;

    /// Install loose package specs with normal dependency resolution
    async fn install_packages(&self, specs: &[String]) -> Result<(), InstallerError>;

    /// Force-install exact specs with dependency resolution disabled
    ///
    /// Used to re-assert version pins; transitive requirements are assumed
    /// already satisfied by earlier steps.
    async fn install_pinned(&self, specs: &[String]) -> Result<(), InstallerError>;

    /// Remove currently installed versions of the given packages
    async fn uninstall(&self, packages: &[String]) -> Result<(), InstallerError>;
}

/// Version-control client (git)
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Shallow-clone a single branch into `dest`
    async fn shallow_clone(
        &self,
        url: &str,
        branch: Option<&str>,
        dest: &Path,
    ) -> Result<(), InstallerError>;
}

/// Run a command to completion, capturing stdout
///
/// Non-zero exit maps to [`InstallerError::CommandFailed`] carrying the
/// trimmed stderr for the step log.
pub(crate) async fn run_capture(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<String, InstallerError> {
    debug!("running: {} {}", program, args.join(" "));

    let mut command = tokio::process::Command::new(program);
    command.args(args).kill_on_drop(true).stdin(Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| InstallerError::Spawn {
        program: program.to_string(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(InstallerError::CommandFailed {
            program: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    String::from_utf8(output.stdout)
        .map_err(|_| InstallerError::InvalidOutput {
            program: program.to_string(),
        })
}

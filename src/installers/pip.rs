//! pip client
//!
//! All pip invocations go through the configured Python interpreter
//! (`python -m pip`) so installs land in the same environment the
//! verification probe later inspects.

use crate::installers::{run_capture, InstallerError, PythonInstaller};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Python package installer backed by `python -m pip`
#[derive(Debug, Clone)]
pub struct PipClient {
    python: String,
    constraints: Option<PathBuf>,
}

impl PipClient {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            constraints: None,
        }
    }

    /// Apply a constraints file to every resolving install, so no
    /// transitive requirement can override the pinned versions
    pub fn with_constraints(mut self, path: impl Into<PathBuf>) -> Self {
        self.constraints = Some(path.into());
        self
    }

    async fn pip(&self, args: &[&str]) -> Result<String, InstallerError> {
        let mut full = vec!["-m", "pip"];
        full.extend_from_slice(args);
        run_capture(&self.python, &full, None).await
    }

    /// Run a resolving `pip install`, constrained when configured
    async fn pip_install(&self, args: &[&str]) -> Result<String, InstallerError> {
        let constraints = self.constraints.as_ref().map(|p| p.to_string_lossy().into_owned());
        let mut full = vec!["install"];
        if let Some(path) = &constraints {
            full.push("-c");
            full.push(path);
        }
        full.extend_from_slice(args);
        self.pip(&full).await
    }
}

#[async_trait]
impl PythonInstaller for PipClient {
    async fn install_requirements(&self, path: &Path) -> Result<(), InstallerError> {
        info!("installing requirements from {}", path.display());
        let path_str = path.to_string_lossy();
        self.pip_install(&["-r", path_str.as_ref()]).await?;
        Ok(())
    }

    async fn install_packages(&self, specs: &[String]) -> Result<(), InstallerError> {
        if specs.is_empty() {
            return Ok(());
        }
        info!("installing {} packages", specs.len());
        let args: Vec<&str> = specs.iter().map(String::as_str).collect();
        self.pip_install(&args).await?;
        Ok(())
    }

    async fn install_pinned(&self, specs: &[String]) -> Result<(), InstallerError> {
        if specs.is_empty() {
            return Ok(());
        }
        info!("force-installing pinned versions: {}", specs.join(", "));
        // --no-deps keeps the resolver from "fixing" the pin back to
        // whatever some other package's range asks for.
        let mut args = vec!["install", "--no-deps", "--force-reinstall"];
        args.extend(specs.iter().map(String::as_str));
        self.pip(&args).await?;
        Ok(())
    }

    async fn uninstall(&self, packages: &[String]) -> Result<(), InstallerError> {
        if packages.is_empty() {
            return Ok(());
        }
        let mut args = vec!["uninstall", "-y"];
        args.extend(packages.iter().map(String::as_str));
        self.pip(&args).await?;
        Ok(())
    }
}

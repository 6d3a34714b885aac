//! Python runtime inspector
//!
//! Shells out to the plan's interpreter with small `-c` snippets. Each
//! probe is a single subprocess so a wedged driver can only hang one
//! check, bounded by the timeout.

use crate::installers::{run_capture, InstallerError};
use crate::verify::{AcceleratorInfo, RuntimeInspector};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

const VERSION_SNIPPET: &str = "import torch; print(torch.__version__)";

const ACCELERATOR_SNIPPET: &str = r#"
import torch
if torch.cuda.is_available():
    p = torch.cuda.get_device_properties(0)
    print(f"{p.name}|{p.total_memory // (1024 * 1024)}")
else:
    print("none")
"#;

const PACKAGE_SNIPPET: &str = r#"
import sys
from importlib.metadata import version, PackageNotFoundError
try:
    print(version(sys.argv[1]))
except PackageNotFoundError:
    print("none")
"#;

const SMOKE_SNIPPET: &str = r#"
import torch
device = "cuda" if torch.cuda.is_available() else "cpu"
a = torch.rand(64, 64, device=device)
(a @ a).sum().item()
print(device)
"#;

/// [`RuntimeInspector`] backed by a Python interpreter with torch installed
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    python: String,
    timeout_secs: u64,
}

impl PythonRuntime {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    async fn eval(&self, snippet: &str, extra: &[&str]) -> Result<String, InstallerError> {
        let mut args = vec!["-c", snippet];
        args.extend_from_slice(extra);
        let duration = Duration::from_secs(self.timeout_secs);
        let output = timeout(duration, run_capture(&self.python, &args, None))
            .await
            .map_err(|_| InstallerError::CommandFailed {
                program: self.python.clone(),
                code: -1,
                stderr: format!("probe timed out after {}s", self.timeout_secs),
            })??;
        Ok(output.trim().to_string())
    }
}

#[async_trait]
impl RuntimeInspector for PythonRuntime {
    async fn runtime_version(&self) -> Result<String, InstallerError> {
        self.eval(VERSION_SNIPPET, &[]).await
    }

    async fn accelerator(&self) -> Result<Option<AcceleratorInfo>, InstallerError> {
        let output = self.eval(ACCELERATOR_SNIPPET, &[]).await?;
        if output == "none" {
            return Ok(None);
        }
        let (name, memory) = output.split_once('|').ok_or_else(|| {
            InstallerError::InvalidOutput {
                program: self.python.clone(),
            }
        })?;
        let total_memory_mb = memory.trim().parse().map_err(|_| {
            InstallerError::InvalidOutput {
                program: self.python.clone(),
            }
        })?;
        debug!("accelerator: {} ({} MiB)", name, total_memory_mb);
        Ok(Some(AcceleratorInfo {
            name: name.trim().to_string(),
            total_memory_mb,
        }))
    }

    async fn package_version(
        &self,
        package: &str,
    ) -> Result<Option<String>, InstallerError> {
        let output = self.eval(PACKAGE_SNIPPET, &[package]).await?;
        if output == "none" {
            Ok(None)
        } else {
            Ok(Some(output))
        }
    }

    async fn smoke_test(&self) -> Result<String, InstallerError> {
        self.eval(SMOKE_SNIPPET, &[]).await
    }
}

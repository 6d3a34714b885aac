//! apt-get client

use crate::installers::{run_capture, InstallerError, SystemPackageManager};
use async_trait::async_trait;
use tracing::info;

/// OS package manager backed by the apt-get CLI
#[derive(Debug, Clone)]
pub struct AptClient {
    program: String,
}

impl AptClient {
    pub fn new() -> Self {
        Self {
            program: "apt-get".to_string(),
        }
    }

    /// Use a different binary (for testing against a stub)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AptClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemPackageManager for AptClient {
    async fn update_index(&self) -> Result<(), InstallerError> {
        info!("updating package index");
        run_capture(&self.program, &["update", "-y"], None).await?;
        Ok(())
    }

    async fn install(&self, packages: &[String]) -> Result<(), InstallerError> {
        if packages.is_empty() {
            return Ok(());
        }
        info!("installing {} system packages", packages.len());
        let mut args = vec!["install", "-y", "--no-install-recommends"];
        args.extend(packages.iter().map(String::as_str));
        run_capture(&self.program, &args, None).await?;
        Ok(())
    }
}

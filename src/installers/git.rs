//! git CLI client

use crate::installers::{run_capture, GitClient, InstallerError};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Version-control client backed by the git CLI
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn shallow_clone(
        &self,
        url: &str,
        branch: Option<&str>,
        dest: &Path,
    ) -> Result<(), InstallerError> {
        info!("cloning {} into {}", url, dest.display());
        let dest_str = dest.to_string_lossy();
        let mut args = vec!["clone", "--depth", "1", "--single-branch"];
        if let Some(branch) = branch {
            args.push("--branch");
            args.push(branch);
        }
        args.push(url);
        args.push(dest_str.as_ref());
        run_capture(&self.program, &args, None).await?;
        Ok(())
    }
}

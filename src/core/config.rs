//! Provisioning plan configuration from YAML

use crate::core::pins::VersionConstraintSet;
use crate::core::repos::RepoListLoader;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level provisioning plan loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Plan name
    pub name: String,

    /// Plan version (optional)
    #[serde(default)]
    pub version: Option<String>,

    /// Python interpreter used for installs and verification
    #[serde(default = "default_python")]
    pub python: String,

    /// Directory the application and plugins are provisioned into
    pub workdir: PathBuf,

    /// Primary application repository
    pub app: AppConfig,

    /// OS packages installed before anything else
    #[serde(default)]
    pub system_packages: Vec<String>,

    /// Path to the newline-delimited plugin repository list
    #[serde(default)]
    pub plugins_file: Option<PathBuf>,

    /// Known plugin basenames whose on-disk directory differs from the URL
    #[serde(default)]
    pub special_cases: HashMap<String, String>,

    /// Exact version pins re-asserted after every install phase
    #[serde(default)]
    pub pins: Vec<String>,

    /// Whether verification requires a visible accelerator
    #[serde(default = "default_true")]
    pub accelerator_required: bool,

    /// Step log destination (defaults to the platform data directory)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Generated wrapper scripts
    #[serde(default)]
    pub scripts: Option<ScriptsConfig>,
}

/// The primary application repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Clone URL
    pub repo: String,

    /// Branch to clone (installer default when unset)
    #[serde(default)]
    pub branch: Option<String>,

    /// Directory name under `workdir`
    #[serde(default = "default_app_dir")]
    pub directory: String,
}

/// Where the generated wrapper scripts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    pub start: PathBuf,
    pub entrypoint: PathBuf,
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_app_dir() -> String {
    "ComfyUI".to_string()
}

fn default_true() -> bool {
    true
}

impl PlanConfig {
    /// Load a plan from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read plan {}", path.as_ref().display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a plan from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PlanConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the plan configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("plan name must not be empty");
        }
        if self.app.repo.trim().is_empty() {
            anyhow::bail!("app.repo must not be empty");
        }
        if self.app.directory.trim().is_empty() {
            anyhow::bail!("app.directory must not be empty");
        }
        for (basename, destination) in &self.special_cases {
            if destination.trim().is_empty() {
                anyhow::bail!(
                    "special case '{}' maps to an empty destination",
                    basename
                );
            }
        }
        self.pin_set()?;
        Ok(())
    }

    /// The plan's pins as a parsed constraint set
    pub fn pin_set(&self) -> Result<VersionConstraintSet> {
        VersionConstraintSet::from_specs(&self.pins).context("invalid pins in plan")
    }

    /// A loader configured with this plan's special cases
    pub fn repo_loader(&self) -> RepoListLoader {
        RepoListLoader::with_special_cases(
            self.special_cases
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// Where the application lands on disk
    pub fn app_dir(&self) -> PathBuf {
        self.workdir.join(&self.app.directory)
    }

    /// Where plugins land on disk
    pub fn plugins_dir(&self) -> PathBuf {
        self.app_dir().join("custom_nodes")
    }

    /// Where the pip constraints file holding the pins is written, when
    /// the plan has any pins
    pub fn constraints_path(&self) -> Option<PathBuf> {
        if self.pins.is_empty() {
            None
        } else {
            Some(self.workdir.join("pip-constraints.txt"))
        }
    }
}

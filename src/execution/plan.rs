//! Plan assembly - turns a plan config into the ordered step list
//!
//! Each action wraps exactly one collaborator call so the pipeline's
//! per-step policy maps one-to-one onto external operations.

use crate::core::{
    PlanConfig, RepositoryEntry, Step, StepAction, StepError, VersionConstraintSet,
};
use crate::execution::PinEnforcer;
use crate::installers::{GitClient, PythonInstaller, SystemPackageManager};
use crate::scripts;
use crate::verify::{Expectations, RuntimeInspector, VerificationProbe};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// The external systems a provisioning run talks to
pub struct Collaborators {
    pub system: Arc<dyn SystemPackageManager>,
    pub python: Arc<dyn PythonInstaller>,
    pub git: Arc<dyn GitClient>,
    pub runtime: Arc<dyn RuntimeInspector>,
}

struct UpdateIndexAction {
    system: Arc<dyn SystemPackageManager>,
}

#[async_trait]
impl StepAction for UpdateIndexAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        self.system.update_index().await?;
        Ok(None)
    }
}

struct InstallSystemPackagesAction {
    system: Arc<dyn SystemPackageManager>,
    packages: Vec<String>,
}

#[async_trait]
impl StepAction for InstallSystemPackagesAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        self.system.install(&self.packages).await?;
        Ok(Some(format!("{} packages", self.packages.len())))
    }
}

struct CloneAction {
    git: Arc<dyn GitClient>,
    url: String,
    branch: Option<String>,
    dest: PathBuf,
}

#[async_trait]
impl StepAction for CloneAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        // Re-runs must be safe: an existing checkout is left alone.
        if self.dest.exists() {
            return Ok(Some(format!("{} already present", self.dest.display())));
        }
        self.git
            .shallow_clone(&self.url, self.branch.as_deref(), &self.dest)
            .await?;
        Ok(None)
    }
}

struct InstallRequirementsAction {
    python: Arc<dyn PythonInstaller>,
    requirements: PathBuf,
    /// Plugins routinely ship without a requirements file
    optional: bool,
}

#[async_trait]
impl StepAction for InstallRequirementsAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        if !self.requirements.exists() {
            if self.optional {
                return Ok(Some("no requirements file".to_string()));
            }
            return Err(StepError::Failed(format!(
                "{} not found",
                self.requirements.display()
            )));
        }
        self.python.install_requirements(&self.requirements).await?;
        Ok(None)
    }
}

struct WriteConstraintsAction {
    path: PathBuf,
    pins: VersionConstraintSet,
}

#[async_trait]
impl StepAction for WriteConstraintsAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = self.pins.as_specs().join("\n");
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(Some(self.path.display().to_string()))
    }
}

struct EnforcePinsAction {
    python: Arc<dyn PythonInstaller>,
    pins: VersionConstraintSet,
}

#[async_trait]
impl StepAction for EnforcePinsAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        PinEnforcer::new(self.python.clone())
            .enforce(&self.pins)
            .await?;
        Ok(Some(format!("{} pins held", self.pins.len())))
    }
}

struct VerifyAction {
    runtime: Arc<dyn RuntimeInspector>,
    expectations: Expectations,
}

#[async_trait]
impl StepAction for VerifyAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        let probe = VerificationProbe::new(self.runtime.clone());
        let result = probe.verify(&self.expectations).await;
        if result.passed {
            Ok(Some(result.summary()))
        } else {
            Err(StepError::Failed(result.summary()))
        }
    }
}

struct WriteScriptsAction {
    config: PlanConfig,
}

#[async_trait]
impl StepAction for WriteScriptsAction {
    async fn run(&self) -> Result<Option<String>, StepError> {
        let Some(scripts_cfg) = &self.config.scripts else {
            return Ok(Some("no wrapper scripts configured".to_string()));
        };
        scripts::write_wrappers(&self.config, scripts_cfg)?;
        Ok(Some(format!(
            "{}, {}",
            scripts_cfg.start.display(),
            scripts_cfg.entrypoint.display()
        )))
    }
}

/// Build the full ordered step list for a plan
///
/// Pins are enforced twice: once before any plugin install can observe the
/// wrong version, and again after plugin requirements may have dragged the
/// pinned packages forward.
pub fn build_steps(
    config: &PlanConfig,
    repos: &[RepositoryEntry],
    collaborators: &Collaborators,
) -> anyhow::Result<Vec<Step>> {
    let pins = config.pin_set()?;
    let app_dir = config.app_dir();
    let plugins_dir = config.plugins_dir();

    let mut steps = Vec::new();

    steps.push(Step::fatal(
        "update package index",
        Arc::new(UpdateIndexAction {
            system: collaborators.system.clone(),
        }),
    ));

    steps.push(Step::fatal(
        "install system packages",
        Arc::new(InstallSystemPackagesAction {
            system: collaborators.system.clone(),
            packages: config.system_packages.clone(),
        }),
    ));

    // The constraints file backs the pip client's `-c` flag so resolving
    // installs cannot upgrade a pinned package even transiently.
    if let Some(path) = config.constraints_path() {
        steps.push(Step::fatal(
            "write pip constraints",
            Arc::new(WriteConstraintsAction {
                path,
                pins: pins.clone(),
            }),
        ));
    }

    steps.push(Step::fatal(
        format!("clone {}", config.app.directory),
        Arc::new(CloneAction {
            git: collaborators.git.clone(),
            url: config.app.repo.clone(),
            branch: config.app.branch.clone(),
            dest: app_dir.clone(),
        }),
    ));

    steps.push(Step::fatal(
        "install base requirements",
        Arc::new(InstallRequirementsAction {
            python: collaborators.python.clone(),
            requirements: app_dir.join("requirements.txt"),
            optional: false,
        }),
    ));

    steps.push(Step::fatal(
        "enforce version pins",
        Arc::new(EnforcePinsAction {
            python: collaborators.python.clone(),
            pins: pins.clone(),
        }),
    ));

    for entry in repos {
        steps.push(Step::best_effort(
            format!("clone plugin {}", entry.destination_name),
            Arc::new(CloneAction {
                git: collaborators.git.clone(),
                url: entry.source_url.clone(),
                branch: None,
                dest: plugins_dir.join(&entry.destination_name),
            }),
        ));
    }

    for entry in repos {
        steps.push(Step::best_effort(
            format!("install plugin requirements {}", entry.destination_name),
            Arc::new(InstallRequirementsAction {
                python: collaborators.python.clone(),
                requirements: plugins_dir
                    .join(&entry.destination_name)
                    .join("requirements.txt"),
                optional: true,
            }),
        ));
    }

    steps.push(Step::fatal(
        "re-enforce version pins",
        Arc::new(EnforcePinsAction {
            python: collaborators.python.clone(),
            pins: pins.clone(),
        }),
    ));

    steps.push(Step::fatal(
        "verify environment",
        Arc::new(VerifyAction {
            runtime: collaborators.runtime.clone(),
            expectations: Expectations {
                accelerator_required: config.accelerator_required,
                pins,
            },
        }),
    ));

    steps.push(Step::fatal(
        "write wrapper scripts",
        Arc::new(WriteScriptsAction {
            config: config.clone(),
        }),
    ));

    Ok(steps)
}

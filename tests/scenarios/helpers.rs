//! Shared test utilities: recording collaborators and plan builders

use async_trait::async_trait;
use provision::core::{PipelineResult, PlanConfig};
use provision::execution::Collaborators;
use provision::installers::{
    GitClient, InstallerError, PythonInstaller, SystemPackageManager,
};
use provision::verify::{AcceleratorInfo, RuntimeInspector};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Call recorder shared by all mock collaborators
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.calls().iter().any(|c| c.contains(needle))
    }
}

fn command_failed(program: &str, stderr: &str) -> InstallerError {
    InstallerError::CommandFailed {
        program: program.to_string(),
        code: 1,
        stderr: stderr.to_string(),
    }
}

/// System package manager that records calls and can be told to fail
pub struct MockSystem {
    pub log: CallLog,
    pub fail_install: bool,
}

impl MockSystem {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_install: false,
        }
    }
}

#[async_trait]
impl SystemPackageManager for MockSystem {
    async fn update_index(&self) -> Result<(), InstallerError> {
        self.log.push("apt:update");
        Ok(())
    }

    async fn install(&self, packages: &[String]) -> Result<(), InstallerError> {
        self.log.push(format!("apt:install {}", packages.join(" ")));
        if self.fail_install {
            return Err(command_failed("apt-get", "unable to locate package"));
        }
        Ok(())
    }
}

/// pip that tracks an installed-version map; requirements installs may
/// bump a package to simulate transitive upgrades
pub struct MockPip {
    pub log: CallLog,
    installed: Mutex<HashMap<String, String>>,
    /// Package spec applied on every requirements install
    pub requirements_side_effect: Option<(String, String)>,
}

impl MockPip {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            installed: Mutex::new(HashMap::new()),
            requirements_side_effect: None,
        }
    }

    pub fn version_of(&self, package: &str) -> Option<String> {
        self.installed.lock().unwrap().get(package).cloned()
    }
}

#[async_trait]
impl PythonInstaller for MockPip {
    async fn install_requirements(&self, path: &Path) -> Result<(), InstallerError> {
        self.log.push(format!("pip:requirements {}", path.display()));
        if let Some((package, version)) = &self.requirements_side_effect {
            self.installed
                .lock()
                .unwrap()
                .insert(package.clone(), version.clone());
        }
        Ok(())
    }

    async fn install_packages(&self, specs: &[String]) -> Result<(), InstallerError> {
        self.log.push(format!("pip:install {}", specs.join(" ")));
        let mut installed = self.installed.lock().unwrap();
        for spec in specs {
            let (p, v) = spec.split_once("==").unwrap();
            installed.insert(p.to_string(), v.to_string());
        }
        Ok(())
    }

    async fn install_pinned(&self, specs: &[String]) -> Result<(), InstallerError> {
        self.log.push(format!("pip:pinned {}", specs.join(" ")));
        let mut installed = self.installed.lock().unwrap();
        for spec in specs {
            let (p, v) = spec.split_once("==").unwrap();
            installed.insert(p.to_string(), v.to_string());
        }
        Ok(())
    }

    async fn uninstall(&self, packages: &[String]) -> Result<(), InstallerError> {
        self.log.push(format!("pip:uninstall {}", packages.join(" ")));
        let mut installed = self.installed.lock().unwrap();
        for package in packages {
            if installed.remove(package).is_none() {
                return Err(command_failed("pip", "not installed"));
            }
        }
        Ok(())
    }
}

/// git that records clones; destinations matching `fail_matching` error
pub struct MockGit {
    pub log: CallLog,
    pub fail_matching: Option<String>,
}

impl MockGit {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_matching: None,
        }
    }
}

#[async_trait]
impl GitClient for MockGit {
    async fn shallow_clone(
        &self,
        url: &str,
        _branch: Option<&str>,
        dest: &Path,
    ) -> Result<(), InstallerError> {
        self.log.push(format!("git:clone {} -> {}", url, dest.display()));
        if let Some(pattern) = &self.fail_matching {
            if url.contains(pattern.as_str()) {
                return Err(command_failed("git", "could not resolve host"));
            }
        }
        std::fs::create_dir_all(dest).unwrap();
        Ok(())
    }
}

/// Runtime whose answers are fixed up front
pub struct StubRuntime {
    pub version: String,
    pub device: Option<AcceleratorInfo>,
    pub installed: Vec<(String, String)>,
    pub compute_ok: bool,
}

impl StubRuntime {
    pub fn healthy() -> Self {
        Self {
            version: "2.4.1+cu121".to_string(),
            device: Some(AcceleratorInfo {
                name: "NVIDIA A10G".to_string(),
                total_memory_mb: 22731,
            }),
            installed: vec![("numpy".to_string(), "1.26.4".to_string())],
            compute_ok: true,
        }
    }

    pub fn without_accelerator() -> Self {
        Self {
            device: None,
            ..Self::healthy()
        }
    }
}

#[async_trait]
impl RuntimeInspector for StubRuntime {
    async fn runtime_version(&self) -> Result<String, InstallerError> {
        Ok(self.version.clone())
    }

    async fn accelerator(&self) -> Result<Option<AcceleratorInfo>, InstallerError> {
        Ok(self.device.clone())
    }

    async fn package_version(
        &self,
        package: &str,
    ) -> Result<Option<String>, InstallerError> {
        Ok(self
            .installed
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(package))
            .map(|(_, v)| v.clone()))
    }

    async fn smoke_test(&self) -> Result<String, InstallerError> {
        if self.compute_ok {
            Ok("cuda:0".to_string())
        } else {
            Err(command_failed("python", "CUDA error"))
        }
    }
}

/// A plan rooted in a temp directory, with the application checkout and
/// its requirements file already on disk so clone-skip and requirements
/// steps behave deterministically
pub fn plan_in(workdir: &Path, pins: &[&str]) -> PlanConfig {
    let app_dir = workdir.join("ComfyUI");
    std::fs::create_dir_all(app_dir.join("custom_nodes")).unwrap();
    std::fs::write(app_dir.join("requirements.txt"), "torch\n").unwrap();

    let pins_yaml = if pins.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = pins.iter().map(|p| format!("  - {}", p)).collect();
        format!("pins:\n{}\n", items.join("\n"))
    };

    PlanConfig::from_yaml(&format!(
        r#"
name: "scenario"
workdir: {workdir}
app:
  repo: https://github.com/comfyanonymous/ComfyUI
system_packages: [git]
{pins}accelerator_required: true
"#,
        workdir = workdir.display(),
        pins = pins_yaml,
    ))
    .unwrap()
}

/// Bundle the standard mocks into collaborators, handing back the handles
/// the scenarios assert against
pub struct TestHarness {
    pub log: CallLog,
    pub pip: Arc<MockPip>,
    pub collaborators: Collaborators,
}

impl TestHarness {
    pub fn new(runtime: StubRuntime) -> Self {
        Self::build(runtime, |_| {}, |_| {})
    }

    pub fn build(
        runtime: StubRuntime,
        tweak_pip: impl FnOnce(&mut MockPip),
        tweak_git: impl FnOnce(&mut MockGit),
    ) -> Self {
        let log = CallLog::new();
        let mut pip = MockPip::new(log.clone());
        tweak_pip(&mut pip);
        let pip = Arc::new(pip);
        let mut git = MockGit::new(log.clone());
        tweak_git(&mut git);

        let collaborators = Collaborators {
            system: Arc::new(MockSystem::new(log.clone())),
            python: pip.clone(),
            git: Arc::new(git),
            runtime: Arc::new(runtime),
        };

        Self {
            log,
            pip,
            collaborators,
        }
    }
}

/// Assert the run completed with no failed steps at all
pub fn assert_clean_completion(result: &PipelineResult) {
    assert!(
        result.is_completed(),
        "expected completion, aborted at {:?}",
        result.failed_step
    );
    let failures: Vec<_> = result
        .log
        .failures()
        .map(|r| r.step_name.clone())
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
}

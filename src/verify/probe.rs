//! Verification probe

use crate::core::pins::VersionConstraintSet;
use crate::verify::RuntimeInspector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// What the probe expects of the provisioned environment
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    /// Fail verification when no accelerator is visible
    pub accelerator_required: bool,

    /// Pinned package versions to compare against installed state
    pub pins: VersionConstraintSet,
}

/// Severity of a single check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    /// Noted but never fails verification (pin mismatches)
    Warning,
    Failed,
}

/// One reported check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Short check identifier ("runtime", "accelerator", "pin:numpy", "compute")
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckOutcome {
    fn passed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Passed,
            detail: detail.into(),
        }
    }

    fn warning(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning,
            detail: detail.into(),
        }
    }

    fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed,
            detail: detail.into(),
        }
    }
}

/// Result of a full verification pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,

    /// Every check outcome, in the order the checks ran
    pub details: Vec<CheckOutcome>,
}

impl VerificationResult {
    /// One-line summary for the step log
    pub fn summary(&self) -> String {
        let failed: Vec<&str> = self
            .details
            .iter()
            .filter(|c| c.status == CheckStatus::Failed)
            .map(|c| c.name.as_str())
            .collect();
        let warnings = self
            .details
            .iter()
            .filter(|c| c.status == CheckStatus::Warning)
            .count();

        if self.passed {
            if warnings > 0 {
                format!("verification passed ({} warning(s))", warnings)
            } else {
                "verification passed".to_string()
            }
        } else {
            format!("verification failed: {}", failed.join(", "))
        }
    }
}

/// Runs the ordered verification checks without short-circuiting
pub struct VerificationProbe {
    runtime: Arc<dyn RuntimeInspector>,
}

impl VerificationProbe {
    pub fn new(runtime: Arc<dyn RuntimeInspector>) -> Self {
        Self { runtime }
    }

    /// Run every check and collect the outcomes
    ///
    /// A failing runtime, accelerator, or compute check marks the result
    /// failed; pin mismatches are warnings only. Later checks are still
    /// attempted after an earlier failure so the report is complete.
    pub async fn verify(&self, expectations: &Expectations) -> VerificationResult {
        let mut details = Vec::new();

        // 1. Runtime importable
        match self.runtime.runtime_version().await {
            Ok(version) => {
                info!("runtime version {}", version);
                details.push(CheckOutcome::passed("runtime", version));
            }
            Err(e) => details.push(CheckOutcome::failed("runtime", e.to_string())),
        }

        // 2. Accelerator visibility
        match self.runtime.accelerator().await {
            Ok(Some(device)) => details.push(CheckOutcome::passed(
                "accelerator",
                format!("{} ({} MiB)", device.name, device.total_memory_mb),
            )),
            Ok(None) if expectations.accelerator_required => {
                details.push(CheckOutcome::failed(
                    "accelerator",
                    "no accelerator visible to the runtime",
                ));
            }
            Ok(None) => details.push(CheckOutcome::warning(
                "accelerator",
                "no accelerator visible (not required)",
            )),
            Err(e) if expectations.accelerator_required => {
                details.push(CheckOutcome::failed("accelerator", e.to_string()));
            }
            Err(e) => details.push(CheckOutcome::warning("accelerator", e.to_string())),
        }

        // 3. Pinned versions; mismatch is a warning, never a failure
        for pin in expectations.pins.pins() {
            let name = format!("pin:{}", pin.package);
            match self.runtime.package_version(&pin.package).await {
                Ok(Some(installed)) if installed == pin.version => {
                    details.push(CheckOutcome::passed(name, installed));
                }
                Ok(Some(installed)) => {
                    warn!(
                        "{} is {} but {} was pinned",
                        pin.package, installed, pin.version
                    );
                    details.push(CheckOutcome::warning(
                        name,
                        format!("installed {} != pinned {}", installed, pin.version),
                    ));
                }
                Ok(None) => details.push(CheckOutcome::warning(name, "not installed")),
                Err(e) => details.push(CheckOutcome::warning(name, e.to_string())),
            }
        }

        // 4. The load-bearing check: a real computation through the stack
        match self.runtime.smoke_test().await {
            Ok(device) => details.push(CheckOutcome::passed(
                "compute",
                format!("matrix multiply ok on {}", device),
            )),
            Err(e) => details.push(CheckOutcome::failed("compute", e.to_string())),
        }

        let passed = details.iter().all(|c| c.status != CheckStatus::Failed);
        VerificationResult { passed, details }
    }
}

//! Version pin enforcer
//!
//! Re-asserts a fixed set of exact package versions after install phases
//! that may have silently upgraded them through transitive resolution.

use crate::core::pins::VersionConstraintSet;
use crate::installers::{InstallerError, PythonInstaller};
use std::sync::Arc;
use tracing::{debug, warn};

/// Forces pinned package versions regardless of resolver choices
pub struct PinEnforcer {
    python: Arc<dyn PythonInstaller>,
}

impl PinEnforcer {
    pub fn new(python: Arc<dyn PythonInstaller>) -> Self {
        Self { python }
    }

    /// Remove whatever versions are installed, then install the exact pins
    /// with dependency resolution disabled
    ///
    /// "Not installed" during removal is expected and ignored; the pins'
    /// own transitive requirements were satisfied by earlier steps.
    /// Running enforce twice in a row leaves the same installed set.
    pub async fn enforce(
        &self,
        constraints: &VersionConstraintSet,
    ) -> Result<(), InstallerError> {
        if constraints.is_empty() {
            debug!("no pins to enforce");
            return Ok(());
        }

        for package in constraints.packages() {
            if let Err(e) = self.python.uninstall(&[package.to_string()]).await {
                warn!("uninstall of {} reported: {} (ignored)", package, e);
            }
        }

        self.python.install_pinned(&constraints.as_specs()).await
    }
}

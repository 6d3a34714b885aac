//! Wrapper script generation
//!
//! Two small executables are written at the end of a successful run: a
//! start script for interactive use and a container entrypoint. Both are
//! static templates with path substitution only.

use crate::core::{PlanConfig, ScriptsConfig};
use std::io;
use std::path::Path;

fn start_script(python: &str, app_dir: &Path) -> String {
    format!(
        "#!/bin/bash\n\
         set -euo pipefail\n\
         \n\
         cd {app_dir}\n\
         exec {python} main.py --listen 0.0.0.0 --port 8188 \"$@\"\n",
        app_dir = app_dir.display(),
        python = python,
    )
}

fn entrypoint_script(start_path: &Path) -> String {
    format!(
        "#!/bin/bash\n\
         set -euo pipefail\n\
         \n\
         # Container entrypoint: hand off to the start script, keeping\n\
         # any arguments passed to the container.\n\
         exec {start} \"$@\"\n",
        start = start_path.display(),
    )
}

fn write_executable(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Write the start script and container entrypoint for a plan
pub fn write_wrappers(config: &PlanConfig, scripts: &ScriptsConfig) -> io::Result<()> {
    write_executable(
        &scripts.start,
        &start_script(&config.python, &config.app_dir()),
    )?;
    write_executable(&scripts.entrypoint, &entrypoint_script(&scripts.start))?;
    Ok(())
}

//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Run a provisioning plan
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to the plan YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Override the plan's plugin list file
    #[arg(long)]
    pub plugins: Option<PathBuf>,

    /// Don't persist the step log to disk
    #[arg(long)]
    pub no_log: bool,

    /// Print the step list without executing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Validate a plan configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to the plan YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse and print the plan's plugin repository list
#[derive(Debug, Args, Clone)]
pub struct ReposCommand {
    /// Path to the plan YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Override the plan's plugin list file
    #[arg(long)]
    pub plugins: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run only the verification probe against an existing environment
#[derive(Debug, Args, Clone)]
pub struct VerifyCommand {
    /// Path to the plan YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ReposCommand, RunCommand, ValidateCommand, VerifyCommand};
use std::ffi::OsString;

/// Declarative GPU environment provisioning for ComfyUI
#[derive(Debug, Parser, Clone)]
#[command(name = "provision")]
#[command(version = "0.1.0")]
#[command(about = "Provision a GPU environment from a declarative plan", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a provisioning plan
    Run(RunCommand),

    /// Validate a plan configuration
    Validate(ValidateCommand),

    /// Parse and print the plugin repository list
    Repos(ReposCommand),

    /// Verify an already-provisioned environment
    Verify(VerifyCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

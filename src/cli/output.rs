//! CLI output formatting

use crate::core::{ParseWarning, PipelineStatus, RepositoryEntry, StepPolicy};
use crate::execution::PipelineEvent;
use crate::verify::{CheckOutcome, CheckStatus, VerificationResult};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the plan's steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a pipeline event for display
pub fn format_pipeline_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::PipelineStarted {
            run_id,
            plan_name,
            total_steps,
        } => format!(
            "{} Provisioning {} ({} steps, run {})",
            ROCKET,
            style(plan_name).bold(),
            total_steps,
            style(&run_id.to_string()[..8]).dim()
        ),
        PipelineEvent::StepStarted { step_name, policy } => {
            if *policy == StepPolicy::BestEffort {
                format!(
                    "{} {} {}",
                    SPINNER,
                    style(step_name).cyan(),
                    style("(best-effort)").dim()
                )
            } else {
                format!("{} {}", SPINNER, style(step_name).cyan())
            }
        }
        PipelineEvent::StepCompleted { step_name, message } => match message {
            Some(message) => format!(
                "{} {} {}",
                CHECK,
                style(step_name).green(),
                style(format!("({})", message)).dim()
            ),
            None => format!("{} {}", CHECK, style(step_name).green()),
        },
        PipelineEvent::StepWarned { step_name, error } => format!(
            "{} {} {}",
            WARN,
            style(step_name).yellow(),
            style(error).dim()
        ),
        PipelineEvent::StepFailed { step_name, error } => {
            format!("{} {}: {}", CROSS, style(step_name).red(), style(error).dim())
        }
        PipelineEvent::PipelineCompleted { run_id, status } => {
            let status_str = match status {
                PipelineStatus::Completed => style("completed").green().to_string(),
                PipelineStatus::Aborted => style("aborted").red().to_string(),
            };
            format!(
                "{} Run {} {}",
                INFO,
                style(&run_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

/// Format a parsed repository entry for display
pub fn format_repository_entry(entry: &RepositoryEntry) -> String {
    let mut line = format!(
        "  {} {} {}",
        style(&entry.destination_name).bold(),
        style("<-").dim(),
        entry.source_url
    );
    if entry.special_case.is_some() {
        line.push_str(&style(" (special case)").yellow().to_string());
    }
    line
}

/// Format a loader warning for display
pub fn format_parse_warning(warning: &ParseWarning) -> String {
    match warning {
        ParseWarning::DuplicateDestination {
            line,
            destination,
            kept_url,
        } => format!(
            "{} duplicate destination {}: {} (kept {})",
            WARN,
            style(destination).bold(),
            style(line).dim(),
            kept_url
        ),
        ParseWarning::EmptyDestination { line } => {
            format!("{} no usable directory name in {}", WARN, style(line).dim())
        }
    }
}

/// Format one verification check outcome
pub fn format_check_outcome(check: &CheckOutcome) -> String {
    let icon = match check.status {
        CheckStatus::Passed => CHECK,
        CheckStatus::Warning => WARN,
        CheckStatus::Failed => CROSS,
    };
    format!(
        "  {}{}: {}",
        icon,
        style(&check.name).bold(),
        style(&check.detail).dim()
    )
}

/// Format a full verification result
pub fn format_verification(result: &VerificationResult) -> String {
    let mut lines: Vec<String> = result.details.iter().map(format_check_outcome).collect();
    let verdict = if result.passed {
        format!("{} {}", CHECK, style("environment verified").green())
    } else {
        format!("{} {}", CROSS, style(result.summary()).red())
    };
    lines.push(verdict);
    lines.join("\n")
}

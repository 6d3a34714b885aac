use anyhow::{Context, Result};
use provision::cli::commands::{ReposCommand, RunCommand, ValidateCommand, VerifyCommand};
use provision::cli::output::*;
use provision::cli::{Cli, Command};
use provision::core::{ParseOutcome, PlanConfig};
use provision::execution::{build_steps, Collaborators, PipelineEvent, ProvisioningPipeline};
use provision::installers::{AptClient, GitCli, PipClient};
use provision::persistence::{FileLogSink, InMemoryLogSink, LogSink};
use provision::verify::{Expectations, PythonRuntime, VerificationProbe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_plan(cmd).await?,
        Command::Validate(cmd) => validate_plan(cmd)?,
        Command::Repos(cmd) => list_repos(cmd)?,
        Command::Verify(cmd) => verify_environment(cmd).await?,
    }

    Ok(())
}

/// Load the plugin list named by the plan (or the override) and parse it
fn load_repos(config: &PlanConfig, override_path: Option<&PathBuf>) -> Result<ParseOutcome> {
    let path = override_path.or(config.plugins_file.as_ref());
    let Some(path) = path else {
        return Ok(ParseOutcome::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plugin list {}", path.display()))?;
    Ok(config.repo_loader().parse(content.lines()))
}

async fn run_plan(cmd: &RunCommand) -> Result<()> {
    let config = PlanConfig::from_file(&cmd.file).context("Failed to load plan")?;

    println!("{} Loaded plan: {}", INFO, style(&config.name).bold());

    let outcome = load_repos(&config, cmd.plugins.as_ref())?;
    for warning in &outcome.warnings {
        println!("{}", format_parse_warning(warning));
    }

    let mut pip = PipClient::new(&config.python);
    if let Some(path) = config.constraints_path() {
        pip = pip.with_constraints(path);
    }
    let collaborators = Collaborators {
        system: Arc::new(AptClient::new()),
        python: Arc::new(pip),
        git: Arc::new(GitCli::new()),
        runtime: Arc::new(PythonRuntime::new(&config.python)),
    };

    let steps = build_steps(&config, &outcome.entries, &collaborators)?;

    if cmd.dry_run {
        println!("{} {} steps:", INFO, steps.len());
        for step in &steps {
            println!(
                "  {} {}",
                style(&step.name).cyan(),
                style(format!("[{}]", step.policy)).dim()
            );
        }
        return Ok(());
    }

    // Set up the step log sink
    let sink: Arc<dyn LogSink> = if cmd.no_log {
        Arc::new(InMemoryLogSink::new())
    } else {
        match &config.log_file {
            Some(path) => Arc::new(FileLogSink::open(path).await?),
            None => Arc::new(FileLogSink::with_default_path().await?),
        }
    };

    let mut pipeline = ProvisioningPipeline::new(&config.name).with_sink(sink);

    // Console output: progress bar plus one line per event
    let progress = create_progress_bar(steps.len());
    let bar = progress.clone();
    pipeline.add_event_handler(move |event| {
        bar.println(format_pipeline_event(event));
        match event {
            PipelineEvent::StepCompleted { .. }
            | PipelineEvent::StepWarned { .. }
            | PipelineEvent::StepFailed { .. } => bar.inc(1),
            PipelineEvent::PipelineCompleted { .. } => bar.finish_and_clear(),
            _ => {}
        }
    });

    let result = pipeline.run(steps).await;
    progress.finish_and_clear();

    if result.is_completed() {
        let warnings = result.log.failures().count();
        if warnings > 0 {
            println!(
                "\n{} {} completed with {} best-effort failure(s)",
                CHECK,
                style(&config.name).bold(),
                style(warnings).yellow()
            );
        } else {
            println!(
                "\n{} {} completed {}",
                CHECK,
                style(&config.name).bold(),
                style("successfully").green()
            );
        }
        Ok(())
    } else {
        let failed = result.failed_step.as_deref().unwrap_or("<unknown>");
        eprintln!(
            "\n{} {} aborted at step {}",
            CROSS,
            style(&config.name).bold(),
            style(failed).red()
        );
        std::process::exit(1);
    }
}

fn validate_plan(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating plan...", INFO);

    match PlanConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Plan configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!(
                "  System packages: {}",
                style(config.system_packages.len()).cyan()
            );
            println!("  Pins: {}", style(config.pins.len()).cyan());
            if let Some(plugins) = &config.plugins_file {
                println!("  Plugin list: {}", style(plugins.display()).cyan());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn list_repos(cmd: &ReposCommand) -> Result<()> {
    let config = PlanConfig::from_file(&cmd.file).context("Failed to load plan")?;
    let outcome = load_repos(&config, cmd.plugins.as_ref())?;

    if cmd.json {
        let entries: Vec<_> = outcome
            .entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "source_url": e.source_url,
                    "destination_name": e.destination_name,
                    "special_case": e.special_case,
                })
            })
            .collect();
        let data = serde_json::json!({
            "entries": entries,
            "duplicates": outcome.warnings.len(),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if outcome.entries.is_empty() {
        println!("{} No plugin repositories configured", INFO);
    } else {
        println!("{} {} plugin repositories:", INFO, outcome.entries.len());
        for entry in &outcome.entries {
            println!("{}", format_repository_entry(entry));
        }
    }
    for warning in &outcome.warnings {
        println!("{}", format_parse_warning(warning));
    }

    Ok(())
}

async fn verify_environment(cmd: &VerifyCommand) -> Result<()> {
    let config = PlanConfig::from_file(&cmd.file).context("Failed to load plan")?;

    let runtime = Arc::new(PythonRuntime::new(&config.python));
    let probe = VerificationProbe::new(runtime);
    let expectations = Expectations {
        accelerator_required: config.accelerator_required,
        pins: config.pin_set()?,
    };

    let result = probe.verify(&expectations).await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_verification(&result));
    }

    if !result.passed {
        std::process::exit(1);
    }
    Ok(())
}

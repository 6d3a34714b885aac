//! Final environment verification as the gate on a full run

use crate::helpers::{plan_in, StubRuntime, TestHarness};
use provision::core::PipelineStatus;
use provision::execution::{build_steps, ProvisioningPipeline};
use provision::verify::{CheckStatus, Expectations, VerificationProbe};
use std::sync::Arc;

#[tokio::test]
async fn test_missing_accelerator_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &[]);
    let harness = TestHarness::new(StubRuntime::without_accelerator());

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_eq!(result.status, PipelineStatus::Aborted);
    assert_eq!(result.failed_step.as_deref(), Some("verify environment"));
    // Everything up to verification still ran.
    assert!(result.log.find("re-enforce version pins").is_some());
    assert!(result.log.find("write wrapper scripts").is_none());
}

#[tokio::test]
async fn test_pin_drift_is_a_warning_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &["numpy==1.26.4"]);

    // Runtime reports a different numpy than pinned.
    let mut runtime = StubRuntime::healthy();
    runtime.installed = vec![("numpy".to_string(), "2.1.0".to_string())];
    let harness = TestHarness::new(runtime);

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    let record = result.log.find("verify environment").unwrap();
    assert!(record.is_success());
    assert!(record.message.as_deref().unwrap().contains("warning"));
}

#[tokio::test]
async fn test_all_checks_run_even_after_an_early_failure() {
    let mut runtime = StubRuntime::without_accelerator();
    runtime.compute_ok = false;

    let config_pins = plan_in(tempfile::tempdir().unwrap().path(), &["numpy==1.26.4"]);
    let probe = VerificationProbe::new(Arc::new(runtime));
    let result = probe
        .verify(&Expectations {
            accelerator_required: true,
            pins: config_pins.pin_set().unwrap(),
        })
        .await;

    assert!(!result.passed);
    // Four checks: runtime, accelerator, one pin, compute.
    assert_eq!(result.details.len(), 4);
    let failed: Vec<&str> = result
        .details
        .iter()
        .filter(|c| c.status == CheckStatus::Failed)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(failed, vec!["accelerator", "compute"]);
}

#[tokio::test]
async fn test_healthy_environment_reports_device() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &[]);
    let harness = TestHarness::new(StubRuntime::healthy());

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_eq!(result.status, PipelineStatus::Completed);
    let record = result.log.find("verify environment").unwrap();
    assert!(record.is_success());
    assert!(record.message.as_deref().unwrap().contains("passed"));
}

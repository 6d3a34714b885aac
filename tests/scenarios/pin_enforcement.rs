//! Version pins must hold at the end of the run no matter what plugin
//! requirements dragged in along the way

use crate::helpers::{assert_clean_completion, plan_in, StubRuntime, TestHarness};
use provision::execution::{build_steps, ProvisioningPipeline};

#[tokio::test]
async fn test_pins_win_over_plugin_requirements() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &["numpy==1.26.4"]);

    // Every requirements install upgrades numpy, as transitive deps do.
    let harness = TestHarness::build(
        StubRuntime::healthy(),
        |pip| {
            pip.requirements_side_effect = Some(("numpy".to_string(), "2.1.0".to_string()));
        },
        |_| {},
    );

    let loader = config.repo_loader();
    let repos = loader.parse(["https://x/y/greedy-node.git"]).entries;
    // The plugin ships a requirements file so its install step runs.
    let plugin_dir = config.plugins_dir().join("greedy-node");
    std::fs::create_dir_all(&plugin_dir).unwrap();
    std::fs::write(plugin_dir.join("requirements.txt"), "numpy>=2\n").unwrap();

    let steps = build_steps(&config, &repos, &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_clean_completion(&result);
    assert_eq!(harness.pip.version_of("numpy").as_deref(), Some("1.26.4"));
}

#[tokio::test]
async fn test_pins_are_enforced_twice() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &["numpy==1.26.4", "opencv-python==4.10.0.84"]);
    let harness = TestHarness::new(StubRuntime::healthy());

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_clean_completion(&result);
    let pinned_calls = harness
        .log
        .calls()
        .iter()
        .filter(|c| c.starts_with("pip:pinned"))
        .count();
    assert_eq!(pinned_calls, 2);
}

#[tokio::test]
async fn test_uninstall_of_absent_package_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    // First enforcement always uninstalls packages that were never
    // installed; the mock errors on that, the run must not.
    let config = plan_in(dir.path(), &["numpy==1.26.4"]);
    let harness = TestHarness::new(StubRuntime::healthy());

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_clean_completion(&result);
    assert!(harness.log.contains("pip:uninstall numpy"));
    assert_eq!(harness.pip.version_of("numpy").as_deref(), Some("1.26.4"));
}

#[tokio::test]
async fn test_plan_without_pins_skips_pip_pinning() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &[]);
    let harness = TestHarness::new(StubRuntime::healthy());

    let steps = build_steps(&config, &[], &harness.collaborators).unwrap();
    let result = ProvisioningPipeline::new(&config.name).run(steps).await;

    assert_clean_completion(&result);
    assert!(!harness.log.contains("pip:pinned"));
    assert!(!harness.log.contains("pip:uninstall"));
}

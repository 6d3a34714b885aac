//! Repository list handling, from file on disk through to clone steps

use crate::helpers::{plan_in, StubRuntime, TestHarness};
use provision::core::{ParseWarning, PlanConfig};
use provision::execution::build_steps;

const PLUGIN_LIST: &str = "\
# image nodes
https://github.com/user/Plugin-A.git
https://github.com/other/plugin-a
https://github.com/user/controlnet_aux.git

https://github.com/user/Plugin-B/
";

fn plan_with_special_cases() -> PlanConfig {
    PlanConfig::from_yaml(
        r#"
name: "repo-list"
workdir: /workspace
app:
  repo: https://github.com/comfyanonymous/ComfyUI
special_cases:
  controlnet_aux: comfyui_controlnet_aux
"#,
    )
    .unwrap()
}

#[test]
fn test_list_file_parses_with_dedup_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let list_path = dir.path().join("plugins.txt");
    std::fs::write(&list_path, PLUGIN_LIST).unwrap();

    let config = plan_with_special_cases();
    let content = std::fs::read_to_string(&list_path).unwrap();
    let outcome = config.repo_loader().parse(content.lines());

    let names: Vec<&str> = outcome
        .entries
        .iter()
        .map(|e| e.destination_name.as_str())
        .collect();
    assert_eq!(names, vec!["Plugin-A", "comfyui_controlnet_aux", "Plugin-B"]);

    // The lowercase duplicate of Plugin-A was dropped with a warning.
    assert_eq!(outcome.warnings.len(), 1);
    match &outcome.warnings[0] {
        ParseWarning::DuplicateDestination {
            destination,
            kept_url,
            ..
        } => {
            assert_eq!(destination, "plugin-a");
            assert!(kept_url.contains("user/Plugin-A"));
        }
        other => panic!("unexpected warning: {:?}", other),
    }
}

#[test]
fn test_parse_is_deterministic() {
    let config = plan_with_special_cases();
    let loader = config.repo_loader();

    let first = loader.parse(PLUGIN_LIST.lines());
    let second = loader.parse(PLUGIN_LIST.lines());
    assert_eq!(first.entries, second.entries);
}

#[tokio::test]
async fn test_every_entry_becomes_a_pair_of_plugin_steps() {
    let dir = tempfile::tempdir().unwrap();
    let config = plan_in(dir.path(), &[]);
    let harness = TestHarness::new(StubRuntime::healthy());

    let outcome = config.repo_loader().parse(PLUGIN_LIST.lines());
    let steps = build_steps(&config, &outcome.entries, &harness.collaborators).unwrap();

    for entry in &outcome.entries {
        assert!(steps
            .iter()
            .any(|s| s.name == format!("clone plugin {}", entry.destination_name)));
        assert!(steps.iter().any(|s| {
            s.name == format!("install plugin requirements {}", entry.destination_name)
        }));
    }

    // All clone steps come before any plugin requirements step.
    let first_req = steps
        .iter()
        .position(|s| s.name.starts_with("install plugin requirements"))
        .unwrap();
    let last_clone = steps
        .iter()
        .rposition(|s| s.name.starts_with("clone plugin"))
        .unwrap();
    assert!(last_clone < first_req);
}

mod common;

use common::{catalog, decider, workflow};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use unfold::dsl::builder::{WorkflowBuilder, simple};
use unfold::dsl::loader;
use unfold::runtime::task::TaskStatus;
use unfold::runtime::workflow::WorkflowStatus;

const WORKFLOW_YAML: &str = r#"
name: "test_workflow"
tasks:
  - reference_name: "L"
    name: "loop_def"
    type: "DO_WHILE"
    loop_condition: "true"
    loop_over:
      - reference_name: "T1"
        name: "t1_def"
        type: "SIMPLE"
"#;

const CATALOG_YAML: &str = r#"
- name: "loop_def"
- name: "t1_def"
"#;

/// Workflow files plus a persisted instance whose first loop iteration finished.
fn fixture(dir: &tempfile::TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let workflow_path = dir.path().join("workflow.yaml");
    let catalog_path = dir.path().join("catalog.yaml");
    let state_path = dir.path().join("state.json");
    fs::write(&workflow_path, WORKFLOW_YAML).expect("Failed to write workflow");
    fs::write(&catalog_path, CATALOG_YAML).expect("Failed to write catalog");

    let def = WorkflowBuilder::new("test_workflow")
        .do_while("L", "loop_def", "true", vec![simple("T1", "t1_def")])
        .build();
    let decider = decider(catalog(&["loop_def", "t1_def"]));
    let mut wf = workflow();
    wf.add_tasks(decider.start(&def, &wf).expect("Start failed"));
    wf.update_status("T1__1", TaskStatus::Completed);
    loader::save_workflow_instance_to_json(&wf, &state_path).expect("Failed to save state");

    (workflow_path, catalog_path, state_path)
}

fn advance(workflow: &Path, catalog: &Path, state: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_unfold"))
        .arg("advance")
        .arg("--workflow").arg(workflow)
        .arg("--catalog").arg(catalog)
        .arg("--state").arg(state)
        .args(["--loop", "L", "--sequential-ids"])
        .args(extra)
        .output()
        .expect("Failed to run unfold")
}

#[test]
fn test_advance_prints_next_iteration() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (workflow_path, catalog_path, state_path) = fixture(&temp_dir);

    let output = advance(&workflow_path, &catalog_path, &state_path, &[]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let decision: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(decision["decision"], "next_iteration");
    assert_eq!(decision["detail"][0]["reference_name"], "L");
    assert_eq!(decision["detail"][0]["iteration"], 2);
    assert_eq!(decision["detail"][1]["reference_name"], "T1__2");
}

#[test]
fn test_advance_honours_iteration_limit_and_saves_failure() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (workflow_path, catalog_path, state_path) = fixture(&temp_dir);

    let output = advance(&workflow_path, &catalog_path, &state_path, &["--max-loop-iterations", "1"]);

    assert!(!output.status.success());
    let saved = loader::load_workflow_instance_from_json(&state_path).expect("Failed to reload state");
    assert_eq!(saved.status, WorkflowStatus::Failed);
    assert_eq!(
        saved.reason_for_incompletion.as_deref(),
        Some("Loop L exceeded the limit of 1 iterations")
    );
    assert_eq!(saved.tasks().len(), 2);
}

#[test]
fn test_decode_and_qualify_commands() {
    let decoded = Command::new(env!("CARGO_BIN_EXE_unfold"))
        .args(["decode", "T1__2__5"])
        .output()
        .expect("Failed to run unfold");
    assert_eq!(String::from_utf8_lossy(&decoded.stdout).trim(), "T1");

    let qualified = Command::new(env!("CARGO_BIN_EXE_unfold"))
        .args(["qualify", "T1", "3"])
        .output()
        .expect("Failed to run unfold");
    assert_eq!(String::from_utf8_lossy(&qualified.stdout).trim(), "T1__3");
}

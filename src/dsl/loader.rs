use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::config::EngineConfig;
use crate::dsl::WorkflowDef;
use crate::runtime::catalog::TaskDefinition;
use crate::runtime::workflow::WorkflowInstance;

pub fn load_workflow_from_yaml(file_path: impl AsRef<Path>) -> Result<WorkflowDef> {
    let file_path = file_path.as_ref();
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path.display()))?;

    let workflow: WorkflowDef = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize YAML content from {}", file_path.display()))?;

    workflow.validate()
        .with_context(|| format!("Invalid workflow definition in {}", file_path.display()))?;

    Ok(workflow)
}

/// Reads a YAML list of task definitions.
pub fn load_catalog_from_yaml(file_path: impl AsRef<Path>) -> Result<Vec<TaskDefinition>> {
    let file_path = file_path.as_ref();
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path.display()))?;

    serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize task definitions from {}", file_path.display()))
}

pub fn load_config_from_yaml(file_path: impl AsRef<Path>) -> Result<EngineConfig> {
    let file_path = file_path.as_ref();
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path.display()))?;

    serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize engine config from {}", file_path.display()))
}

/// Reads a persisted workflow instance (JSON) and rebuilds its indexes.
pub fn load_workflow_instance_from_json(file_path: impl AsRef<Path>) -> Result<WorkflowInstance> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read workflow state from {}", file_path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to deserialize workflow state from {}", file_path.display()))
}

/// Writes a workflow instance back to disk as pretty JSON.
pub fn save_workflow_instance_to_json(instance: &WorkflowInstance, file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    let content = serde_json::to_string_pretty(instance)
        .with_context(|| format!("Failed to serialize workflow {}", instance.workflow_id))?;

    fs::write(file_path, content)
        .with_context(|| format!("Failed to write workflow state to {}", file_path.display()))
}

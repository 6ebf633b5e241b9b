use serde_json::json;
use crate::dsl::{ConstructType, NodeKind};
use crate::error::ExpansionError;
use crate::expanders::TaskExpander;
use crate::runtime::context::ExpansionContext;
use crate::runtime::task::TaskInstance;

#[derive(Debug, Default)]
pub struct SubWorkflowExpander;

impl SubWorkflowExpander {
    pub fn new() -> Self {
        Self
    }
}

impl TaskExpander for SubWorkflowExpander {
    fn construct_type(&self) -> ConstructType {
        ConstructType::SubWorkflow
    }

    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError> {
        let node = ctx.node;
        let NodeKind::SubWorkflow { sub_workflow } = &node.kind else {
            return Err(ExpansionError::invalid(&node.reference_name, "not a sub-workflow node"));
        };

        if ctx.is_already_terminal() {
            return Ok(Vec::new());
        }

        if sub_workflow.name.trim().is_empty() {
            return Err(ExpansionError::invalid(&node.reference_name, "sub-workflow name is empty"));
        }

        let mut task = ctx.new_task(ConstructType::SubWorkflow);
        if let Some(input) = task.input_data.as_object_mut() {
            input.insert("subWorkflowName".to_string(), json!(sub_workflow.name));
            input.insert("subWorkflowVersion".to_string(), json!(sub_workflow.version));
        }
        Ok(vec![task])
    }
}

use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::Value;
use crate::dsl::{ConstructType, DefinitionNode};
use crate::error::ExpansionError;
use crate::runtime::catalog::{TaskDefCatalog, TaskDefinition};
use crate::runtime::delegate::SubExpander;
use crate::runtime::ids::IdSequence;
use crate::runtime::task::{TaskInstance, TaskStatus};
use crate::runtime::workflow::WorkflowInstance;

/// Expansion context
/// Read-only view handed to an expander for a single node of one decision cycle
pub struct ExpansionContext<'a> {
    pub node: &'a DefinitionNode,
    pub workflow: &'a WorkflowInstance,
    /// Id for the first task this expansion creates
    pub task_id: String,
    /// Iteration requested by the scheduler; 1 on the first pass
    pub iteration: u32,
    /// Pre-resolved definition that takes precedence over the catalog
    pub task_definition: Option<Arc<TaskDefinition>>,
    pub catalog: &'a dyn TaskDefCatalog,
    pub ids: &'a IdSequence<'a>,
    pub sub_expander: &'a dyn SubExpander,
    pub scheduled_at: DateTime<Utc>,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(
        node: &'a DefinitionNode,
        workflow: &'a WorkflowInstance,
        task_id: String,
        catalog: &'a dyn TaskDefCatalog,
        ids: &'a IdSequence<'a>,
        sub_expander: &'a dyn SubExpander,
    ) -> Self {
        Self {
            node,
            workflow,
            task_id,
            iteration: 1,
            task_definition: None,
            catalog,
            ids,
            sub_expander,
            scheduled_at: Utc::now(),
        }
    }

    pub fn iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration.max(1);
        self
    }

    pub fn task_definition(mut self, definition: Arc<TaskDefinition>) -> Self {
        self.task_definition = Some(definition);
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = at;
        self
    }

    /// True when the node's bare-named task exists and has finished.
    pub fn is_already_terminal(&self) -> bool {
        self.workflow
            .task_by_ref(&self.node.reference_name)
            .is_some_and(|task| task.status.is_terminal())
    }

    /// Override first, then the catalog.
    pub fn resolve_task_definition(&self) -> Result<Arc<TaskDefinition>, ExpansionError> {
        self.task_definition
            .clone()
            .or_else(|| self.catalog.lookup(&self.node.name))
            .ok_or_else(|| ExpansionError::MissingTaskDefinition {
                name: self.node.name.clone(),
            })
    }

    /// A SCHEDULED task for this node carrying the workflow's identity.
    pub fn new_task(&self, construct_type: ConstructType) -> TaskInstance {
        let input_data = Value::Object(
            self.node
                .input_parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        TaskInstance {
            task_id: self.task_id.clone(),
            construct_type,
            definition_name: self.node.name.clone(),
            reference_name: self.node.reference_name.clone(),
            definition_ref: self.node.reference_name.clone(),
            workflow_instance_id: self.workflow.workflow_id.clone(),
            correlation_id: self.workflow.correlation_id.clone(),
            workflow_type: self.workflow.workflow_name.clone(),
            scheduled_time: self.scheduled_at,
            iteration: self.iteration,
            retry_count: 0,
            status: TaskStatus::Scheduled,
            rate_limit_per_frequency: 0,
            rate_limit_frequency_in_seconds: 0,
            input_data,
            output_data: Value::Null,
        }
    }
}

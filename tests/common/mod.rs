#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use unfold::EngineConfig;
use unfold::dsl::{ConstructType, DefinitionNode};
use unfold::error::ExpansionError;
use unfold::runtime::catalog::{InMemoryCatalog, TaskDefinition};
use unfold::runtime::clock::FixedClock;
use unfold::runtime::decider::Decider;
use unfold::runtime::delegate::SubExpander;
use unfold::runtime::ids::{IdSequence, IdStrategy};
use unfold::runtime::task::{TaskInstance, TaskStatus};
use unfold::runtime::workflow::WorkflowInstance;

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub fn catalog(names: &[&str]) -> InMemoryCatalog {
    InMemoryCatalog::from_definitions(names.iter().map(|n| TaskDefinition::new(n)))
}

pub fn workflow() -> WorkflowInstance {
    WorkflowInstance::with_id("wf-1", "test_workflow", 1).correlation_id("corr-1")
}

pub fn decider(catalog: InMemoryCatalog) -> Decider {
    let config = EngineConfig {
        max_loop_iterations: 10,
        id_strategy: IdStrategy::Sequential,
    };
    Decider::new(Arc::new(catalog), config).with_clock(Arc::new(FixedClock::new(fixed_time())))
}

/// Body delegate that turns any node into a single scheduled leaf task.
pub struct LeafBody;

impl SubExpander for LeafBody {
    fn expand_node(
        &self,
        workflow: &WorkflowInstance,
        node: &DefinitionNode,
        ids: &IdSequence<'_>,
    ) -> Result<Vec<TaskInstance>, ExpansionError> {
        Ok(vec![TaskInstance {
            task_id: ids.next_id(),
            construct_type: ConstructType::Leaf,
            definition_name: node.name.clone(),
            reference_name: node.reference_name.clone(),
            definition_ref: node.reference_name.clone(),
            workflow_instance_id: workflow.workflow_id.clone(),
            correlation_id: workflow.correlation_id.clone(),
            workflow_type: workflow.workflow_name.clone(),
            scheduled_time: fixed_time(),
            iteration: 1,
            retry_count: 0,
            status: TaskStatus::Scheduled,
            rate_limit_per_frequency: 0,
            rate_limit_frequency_in_seconds: 0,
            input_data: Value::Null,
            output_data: Value::Null,
        }])
    }
}

/// Body delegate whose node has nothing left to schedule.
pub struct EmptyBody;

impl SubExpander for EmptyBody {
    fn expand_node(
        &self,
        _workflow: &WorkflowInstance,
        _node: &DefinitionNode,
        _ids: &IdSequence<'_>,
    ) -> Result<Vec<TaskInstance>, ExpansionError> {
        Ok(Vec::new())
    }
}

pub fn refs(tasks: &[TaskInstance]) -> Vec<&str> {
    tasks.iter().map(|t| t.reference_name.as_str()).collect()
}

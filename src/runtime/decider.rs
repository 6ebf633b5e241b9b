use std::collections::HashMap;
use std::sync::Arc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::config::EngineConfig;
use crate::dsl::{DefinitionNode, NodeKind, WorkflowDef};
use crate::error::ExpansionError;
use crate::expanders::{DoWhileExpander, ExpanderRegistry, ForkJoinExpander};
use crate::expanders::naming::{qualify, LOOP_TASK_DELIMITER};
use crate::runtime::catalog::TaskDefCatalog;
use crate::runtime::clock::{Clock, SystemClock};
use crate::runtime::context::ExpansionContext;
use crate::runtime::delegate::SubExpander;
use crate::runtime::expr::Expression;
use crate::runtime::ids::{IdSequence, TaskIdAllocator};
use crate::runtime::task::TaskInstance;
use crate::runtime::workflow::WorkflowInstance;

/// Outcome of checking a running loop after its body made progress
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum LoopDecision {
    /// Some body task of the current iteration is still running
    Pending,
    /// Next body node of the current iteration, already qualified
    NextTask(Vec<TaskInstance>),
    /// Condition held: control task (same id) plus the next iteration's first batch
    NextIteration(Vec<TaskInstance>),
    /// Condition failed: the caller marks the control task completed
    Complete,
    /// A body task ended unsuccessfully
    Failed(String),
}

/// Minimal decision-cycle driver.
///
/// Dispatches nodes through the registry, hands itself to control-flow
/// expanders as the body delegate, and decides whether loops go around
/// again. Persisting the returned batches is the caller's job.
pub struct Decider {
    registry: ExpanderRegistry,
    catalog: Arc<dyn TaskDefCatalog>,
    ids: Box<dyn TaskIdAllocator>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Decider {
    pub fn new(catalog: Arc<dyn TaskDefCatalog>, config: EngineConfig) -> Self {
        Self {
            registry: ExpanderRegistry::standard(),
            catalog,
            ids: config.id_strategy.allocator(),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_registry(mut self, registry: ExpanderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_allocator(mut self, ids: Box<dyn TaskIdAllocator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expands a node with an explicit iteration and task id.
    pub fn expand_at(
        &self,
        workflow: &WorkflowInstance,
        node: &DefinitionNode,
        ids: &IdSequence<'_>,
        iteration: u32,
        task_id: String,
    ) -> Result<Vec<TaskInstance>, ExpansionError> {
        let expander = self.registry.get(node.construct_type())?;
        let ctx = ExpansionContext::new(node, workflow, task_id, self.catalog.as_ref(), ids, self)
            .iteration(iteration)
            .scheduled_at(self.clock.now());
        expander.expand(&ctx)
    }

    /// First batch of a freshly started workflow.
    pub fn start(&self, def: &WorkflowDef, workflow: &WorkflowInstance) -> Result<Vec<TaskInstance>, ExpansionError> {
        let first = def
            .first_node()
            .ok_or_else(|| ExpansionError::invalid(&def.name, "workflow has no tasks"))?;
        self.schedule(workflow, first)
    }

    /// Expands one node in a new decision cycle.
    pub fn schedule(&self, workflow: &WorkflowInstance, node: &DefinitionNode) -> Result<Vec<TaskInstance>, ExpansionError> {
        self.schedule_at(workflow, node, 1)
    }

    /// Like [`Decider::schedule`] with an explicit requested iteration.
    pub fn schedule_at(
        &self,
        workflow: &WorkflowInstance,
        node: &DefinitionNode,
        iteration: u32,
    ) -> Result<Vec<TaskInstance>, ExpansionError> {
        let ids = self.sequence(workflow);
        let task_id = ids.next_id();
        let result = self.expand_at(workflow, node, &ids, iteration, task_id);
        match &result {
            Ok(tasks) => debug!(
                workflow_id = %workflow.workflow_id,
                reference = %node.reference_name,
                scheduled = tasks.len(),
                "decision cycle done"
            ),
            Err(e) => warn!(workflow_id = %workflow.workflow_id, reason = %e, "terminating workflow"),
        }
        result
    }

    /// Decides what a running loop needs next.
    ///
    /// `loop_ref` is the bare reference name of a top-level loop (a loop that
    /// is not itself inside another loop body).
    pub fn advance_loop(
        &self,
        def: &WorkflowDef,
        workflow: &WorkflowInstance,
        loop_ref: &str,
    ) -> Result<LoopDecision, ExpansionError> {
        let result = self.decide_loop(def, workflow, loop_ref);
        if let Err(e) = &result {
            warn!(workflow_id = %workflow.workflow_id, reference = %loop_ref, reason = %e, "terminating workflow");
        }
        result
    }

    fn decide_loop(
        &self,
        def: &WorkflowDef,
        workflow: &WorkflowInstance,
        loop_ref: &str,
    ) -> Result<LoopDecision, ExpansionError> {
        if loop_ref.contains(LOOP_TASK_DELIMITER) {
            return Err(ExpansionError::invalid(loop_ref, "loops nested in another loop body cannot be advanced"));
        }
        let node = def
            .find_node(loop_ref)
            .ok_or_else(|| ExpansionError::invalid(loop_ref, "no such node in the workflow definition"))?;
        let NodeKind::DoWhile { loop_condition, .. } = &node.kind else {
            return Err(ExpansionError::invalid(loop_ref, "not a loop node"));
        };
        let control = workflow
            .task_by_ref(loop_ref)
            .filter(|task| !task.status.is_terminal())
            .ok_or_else(|| ExpansionError::ControlTaskMissing {
                reference_name: loop_ref.to_string(),
            })?;
        let iteration = control.iteration;

        let mut outputs: HashMap<String, Value> = workflow.input.clone();
        for body_node in node.loop_over() {
            for reference in tracked_references(body_node) {
                let Some(task) = workflow.task_by_ref(&qualify(&reference, iteration)) else {
                    let ids = self.sequence(workflow);
                    let mut batch = self.expand_node(workflow, body_node, &ids)?;
                    DoWhileExpander::tag_iteration(&mut batch, iteration);
                    debug!(reference = %loop_ref, iteration, next = %body_node.reference_name, "scheduling next body task");
                    return Ok(LoopDecision::NextTask(batch));
                };
                if !task.status.is_terminal() {
                    return Ok(LoopDecision::Pending);
                }
                if !task.status.is_successful() {
                    return Ok(LoopDecision::Failed(format!(
                        "Task {} of loop {} ended with status {:?}",
                        task.reference_name, loop_ref, task.status
                    )));
                }
                flatten_output(&reference, &task.output_data, &mut outputs);
            }
        }
        outputs.insert("iteration".to_string(), json!(iteration));

        let should_continue = Expression::compile(loop_condition)
            .and_then(|expr| expr.eval_boolean(&outputs))
            .map_err(|e| ExpansionError::invalid(loop_ref, e.to_string()))?;
        debug!(reference = %loop_ref, iteration, should_continue, "loop condition evaluated");

        if !should_continue {
            return Ok(LoopDecision::Complete);
        }
        if iteration >= self.config.max_loop_iterations {
            return Err(ExpansionError::IterationLimit {
                reference_name: loop_ref.to_string(),
                limit: self.config.max_loop_iterations,
            });
        }

        let ids = self.sequence(workflow);
        let batch = self.expand_at(workflow, node, &ids, iteration + 1, control.task_id.clone())?;
        Ok(LoopDecision::NextIteration(batch))
    }

    fn sequence<'a>(&'a self, workflow: &'a WorkflowInstance) -> IdSequence<'a> {
        IdSequence::new(&workflow.workflow_id, self.ids.as_ref(), workflow.issued())
    }
}

impl SubExpander for Decider {
    fn expand_node(
        &self,
        workflow: &WorkflowInstance,
        node: &DefinitionNode,
        ids: &IdSequence<'_>,
    ) -> Result<Vec<TaskInstance>, ExpansionError> {
        let task_id = ids.next_id();
        self.expand_at(workflow, node, ids, 1, task_id)
    }
}

/// Reference names whose tasks must finish before a body node counts as done.
fn tracked_references(node: &DefinitionNode) -> Vec<String> {
    match node.kind {
        NodeKind::ForkJoin { .. } => vec![
            node.reference_name.clone(),
            ForkJoinExpander::join_reference(&node.reference_name),
        ],
        _ => vec![node.reference_name.clone()],
    }
}

/// Exposes scalar outputs to the loop condition as `<ref>_<key>`.
fn flatten_output(reference: &str, output: &Value, vars: &mut HashMap<String, Value>) {
    if let Some(obj) = output.as_object() {
        for (key, value) in obj {
            vars.insert(format!("{}_{}", reference, key), value.clone());
        }
    }
}

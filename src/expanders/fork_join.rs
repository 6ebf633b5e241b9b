use serde_json::json;
use tracing::debug;
use crate::dsl::{ConstructType, NodeKind};
use crate::error::ExpansionError;
use crate::expanders::TaskExpander;
use crate::runtime::context::ExpansionContext;
use crate::runtime::task::{TaskInstance, TaskStatus};

/// Fan-out/fan-in: a completed fork task, the first task of every branch,
/// and a synthesized join task waiting on the branch tails.
#[derive(Debug, Default)]
pub struct ForkJoinExpander;

impl ForkJoinExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn join_reference(fork_reference: &str) -> String {
        format!("{}_join", fork_reference)
    }
}

impl TaskExpander for ForkJoinExpander {
    fn construct_type(&self) -> ConstructType {
        ConstructType::FanOut
    }

    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError> {
        let node = ctx.node;
        let NodeKind::ForkJoin { fork_tasks } = &node.kind else {
            return Err(ExpansionError::invalid(&node.reference_name, "not a fork node"));
        };

        if ctx.is_already_terminal() {
            return Ok(Vec::new());
        }

        if fork_tasks.iter().all(|branch| branch.is_empty()) {
            return Err(ExpansionError::invalid(&node.reference_name, "fork has no branches"));
        }

        let mut fork_task = ctx.new_task(ConstructType::FanOut);
        fork_task.status = TaskStatus::Completed;

        let mut tasks = vec![fork_task];
        let mut join_on = Vec::new();
        for branch in fork_tasks.iter().filter(|b| !b.is_empty()) {
            tasks.extend(ctx.sub_expander.expand_node(ctx.workflow, &branch[0], ctx.ids)?);
            if let Some(tail) = branch.last() {
                join_on.push(tail.reference_name.clone());
            }
        }

        let mut join_task = ctx.new_task(ConstructType::Join);
        join_task.task_id = ctx.ids.next_id();
        join_task.definition_name = "JOIN".to_string();
        join_task.reference_name = Self::join_reference(&node.reference_name);
        join_task.status = TaskStatus::InProgress;
        join_task.input_data = json!({ "joinOn": join_on });

        debug!(
            reference = %node.reference_name,
            branches = join_on.len(),
            "fork expanded"
        );

        tasks.push(join_task);
        Ok(tasks)
    }
}

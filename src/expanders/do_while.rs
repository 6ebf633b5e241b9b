use serde_json::Value;
use tracing::debug;
use crate::dsl::{ConstructType, NodeKind};
use crate::error::ExpansionError;
use crate::expanders::TaskExpander;
use crate::expanders::naming::qualify;
use crate::runtime::context::ExpansionContext;
use crate::runtime::task::TaskInstance;

/// Expands a repeat-until loop into its control task followed by the
/// current iteration of the body's first node.
///
/// The control task keeps the bare reference name so the scheduler can find
/// the loop; every body task is renamed `<ref>__<iteration>` so successive
/// iterations never collide in the workflow's reference index.
#[derive(Debug, Default)]
pub struct DoWhileExpander;

impl DoWhileExpander {
    pub fn new() -> Self {
        Self
    }

    /// Qualifies delegated body tasks with the loop's iteration.
    ///
    /// Join tasks wait on branch tails by reference name, so their `joinOn`
    /// entries are qualified along with the tasks they point at.
    pub fn tag_iteration(tasks: &mut [TaskInstance], iteration: u32) {
        for task in tasks {
            task.reference_name = qualify(&task.reference_name, iteration);
            task.iteration = iteration;
            if task.construct_type == ConstructType::Join {
                if let Some(Value::Array(join_on)) = task.input_data.get_mut("joinOn") {
                    for entry in join_on.iter_mut() {
                        if let Some(reference) = entry.as_str() {
                            *entry = Value::String(qualify(reference, iteration));
                        }
                    }
                }
            }
        }
    }
}

impl TaskExpander for DoWhileExpander {
    fn construct_type(&self) -> ConstructType {
        ConstructType::Loop
    }

    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError> {
        let node = ctx.node;
        debug!(reference = %node.reference_name, iteration = ctx.iteration, "expanding loop");

        if ctx.is_already_terminal() {
            debug!(reference = %node.reference_name, "loop already finished");
            return Ok(Vec::new());
        }

        let task_def = ctx.resolve_task_definition()?;

        let NodeKind::DoWhile { loop_condition, loop_over } = &node.kind else {
            return Err(ExpansionError::invalid(&node.reference_name, "not a loop node"));
        };
        let first = loop_over
            .first()
            .ok_or_else(|| ExpansionError::invalid(&node.reference_name, "loop body is empty"))?;

        let mut loop_task = ctx.new_task(ConstructType::Loop);
        loop_task.rate_limit_per_frequency = task_def.rate_limit_per_frequency;
        loop_task.rate_limit_frequency_in_seconds = task_def.rate_limit_frequency_in_seconds;
        if let Some(input) = loop_task.input_data.as_object_mut() {
            input.insert("loop_condition".to_string(), Value::String(loop_condition.clone()));
        }

        let iteration = loop_task.iteration;
        let mut body = ctx.sub_expander.expand_node(ctx.workflow, first, ctx.ids)?;
        Self::tag_iteration(&mut body, iteration);

        debug!(
            reference = %node.reference_name,
            iteration,
            body_tasks = body.len(),
            "loop expanded"
        );

        let mut tasks = Vec::with_capacity(body.len() + 1);
        tasks.push(loop_task);
        tasks.extend(body);
        Ok(tasks)
    }
}

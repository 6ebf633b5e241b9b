use tracing::debug;
use crate::dsl::ConstructType;
use crate::error::ExpansionError;
use crate::expanders::TaskExpander;
use crate::runtime::context::ExpansionContext;
use crate::runtime::task::TaskInstance;

/// Leaf tasks: exactly one scheduled instance bound to a catalog definition.
#[derive(Debug, Default)]
pub struct SimpleExpander;

impl SimpleExpander {
    pub fn new() -> Self {
        Self
    }
}

impl TaskExpander for SimpleExpander {
    fn construct_type(&self) -> ConstructType {
        ConstructType::Leaf
    }

    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError> {
        debug!(reference = %ctx.node.reference_name, "expanding simple task");

        if ctx.is_already_terminal() {
            return Ok(Vec::new());
        }

        let task_def = ctx.resolve_task_definition()?;

        let mut task = ctx.new_task(ConstructType::Leaf);
        task.rate_limit_per_frequency = task_def.rate_limit_per_frequency;
        task.rate_limit_frequency_in_seconds = task_def.rate_limit_frequency_in_seconds;

        Ok(vec![task])
    }
}

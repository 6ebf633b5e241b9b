use serde_json::json;
use tracing::debug;
use crate::dsl::{ConstructType, NodeKind};
use crate::error::ExpansionError;
use crate::expanders::TaskExpander;
use crate::runtime::context::ExpansionContext;
use crate::runtime::expr::Expression;
use crate::runtime::task::{TaskInstance, TaskStatus};

/// Branch construct: picks a case from the workflow input and schedules the
/// first node of that case behind an in-progress decision task.
#[derive(Debug, Default)]
pub struct DecisionExpander;

impl DecisionExpander {
    pub fn new() -> Self {
        Self
    }
}

impl TaskExpander for DecisionExpander {
    fn construct_type(&self) -> ConstructType {
        ConstructType::Branch
    }

    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError> {
        let node = ctx.node;
        let NodeKind::Decision { case_expression, decision_cases, default_case } = &node.kind else {
            return Err(ExpansionError::invalid(&node.reference_name, "not a decision node"));
        };

        if ctx.is_already_terminal() {
            return Ok(Vec::new());
        }

        let case = Expression::compile(case_expression)
            .and_then(|expr| expr.eval_case(&ctx.workflow.input))
            .map_err(|e| ExpansionError::invalid(&node.reference_name, e.to_string()))?;

        let selected = decision_cases.get(&case).unwrap_or(default_case);
        debug!(
            reference = %node.reference_name,
            case = %case,
            matched = decision_cases.contains_key(&case),
            "decision evaluated"
        );

        let mut decision_task = ctx.new_task(ConstructType::Branch);
        decision_task.status = TaskStatus::InProgress;
        if let Some(input) = decision_task.input_data.as_object_mut() {
            input.insert("case".to_string(), json!(case));
        }

        let mut tasks = vec![decision_task];
        if let Some(first) = selected.first() {
            tasks.extend(ctx.sub_expander.expand_node(ctx.workflow, first, ctx.ids)?);
        }
        Ok(tasks)
    }
}

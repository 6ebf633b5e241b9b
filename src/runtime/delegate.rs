use crate::dsl::DefinitionNode;
use crate::error::ExpansionError;
use crate::runtime::ids::IdSequence;
use crate::runtime::task::TaskInstance;
use crate::runtime::workflow::WorkflowInstance;

/// Body sub-expansion capability.
///
/// Control-flow expanders call back through this to expand a child node as
/// if it were the next node to schedule. Implementations dispatch through
/// the full registry, so nested constructs recurse naturally.
pub trait SubExpander: Send + Sync {
    fn expand_node(
        &self,
        workflow: &WorkflowInstance,
        node: &DefinitionNode,
        ids: &IdSequence<'_>,
    ) -> Result<Vec<TaskInstance>, ExpansionError>;
}

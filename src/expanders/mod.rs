use std::fmt::Debug;
use crate::dsl::ConstructType;
use crate::error::ExpansionError;
use crate::runtime::context::ExpansionContext;
use crate::runtime::task::TaskInstance;

pub mod naming;
pub mod registry;
pub mod do_while;
pub mod simple;
pub mod decision;
pub mod fork_join;
pub mod sub_workflow;

pub use self::do_while::DoWhileExpander;
pub use self::simple::SimpleExpander;
pub use self::decision::DecisionExpander;
pub use self::fork_join::ForkJoinExpander;
pub use self::sub_workflow::SubWorkflowExpander;
pub use self::registry::ExpanderRegistry;

/// Expander interface: one implementation per construct type.
///
/// `expand` turns the context's node into the ordered batch of new task
/// instances the caller must persist. It reads the workflow instance but
/// never mutates it, returns an empty batch when the construct has already
/// finished, and fails with a termination signal when the node cannot be
/// expanded at all.
pub trait TaskExpander: Send + Sync + Debug {
    fn construct_type(&self) -> ConstructType;
    fn expand(&self, ctx: &ExpansionContext<'_>) -> Result<Vec<TaskInstance>, ExpansionError>;
}

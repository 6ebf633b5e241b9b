use thiserror::Error;
use crate::dsl::ConstructType;

/// Termination signals raised while expanding a definition node.
///
/// Every variant is fatal to the owning workflow instance: the caller marks
/// the instance failed with [`ExpansionError::reason`] and stops expanding it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("Invalid task specified. Cannot find task by name {name} in the task definitions")]
    MissingTaskDefinition { name: String },

    #[error("No expander registered for construct type {0}")]
    UnsupportedConstruct(ConstructType),

    #[error("Invalid definition for task {reference_name}: {reason}")]
    InvalidDefinition {
        reference_name: String,
        reason: String,
    },

    #[error("Loop {reference_name} exceeded the limit of {limit} iterations")]
    IterationLimit { reference_name: String, limit: u32 },

    #[error("No live control task found for loop {reference_name}")]
    ControlTaskMissing { reference_name: String },
}

impl ExpansionError {
    pub fn invalid(reference_name: &str, reason: impl Into<String>) -> Self {
        ExpansionError::InvalidDefinition {
            reference_name: reference_name.to_string(),
            reason: reason.into(),
        }
    }

    /// Human readable reason recorded on the failed workflow instance.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Authoring errors found when validating a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("workflow {0} has no tasks")]
    NoTasks(String),

    #[error("duplicate task reference name: '{0}'")]
    DuplicateReference(String),

    #[error("task reference name '{0}' contains the reserved loop delimiter")]
    ReservedDelimiter(String),

    #[error("loop '{0}' has an empty body")]
    EmptyLoopBody(String),
}

/// Errors raised while assembling an expander registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("an expander for construct type {0} is already registered")]
    AlreadyRegistered(ConstructType),
}

use std::collections::HashMap;
use std::sync::Arc;
use crate::dsl::ConstructType;
use crate::error::{ExpansionError, RegistryError};
use crate::expanders::{
    DecisionExpander, DoWhileExpander, ForkJoinExpander, SimpleExpander, SubWorkflowExpander,
    TaskExpander,
};

/// Construct type -> expander table, built once at startup.
///
/// There is no fallback entry: dispatching a tag nobody registered is a
/// termination signal.
#[derive(Debug, Default)]
pub struct ExpanderRegistry {
    expanders: HashMap<ConstructType, Arc<dyn TaskExpander>>,
}

impl ExpanderRegistry {
    pub fn new() -> Self {
        Self {
            expanders: HashMap::new(),
        }
    }

    /// Every authorable construct.
    pub fn standard() -> Self {
        let standard: [Arc<dyn TaskExpander>; 5] = [
            Arc::new(SimpleExpander::new()),
            Arc::new(DoWhileExpander::new()),
            Arc::new(DecisionExpander::new()),
            Arc::new(ForkJoinExpander::new()),
            Arc::new(SubWorkflowExpander::new()),
        ];
        Self {
            expanders: standard
                .into_iter()
                .map(|expander| (expander.construct_type(), expander))
                .collect(),
        }
    }

    pub fn register(&mut self, expander: Arc<dyn TaskExpander>) -> Result<(), RegistryError> {
        let construct_type = expander.construct_type();
        if self.expanders.contains_key(&construct_type) {
            return Err(RegistryError::AlreadyRegistered(construct_type));
        }
        self.expanders.insert(construct_type, expander);
        Ok(())
    }

    pub fn get(&self, construct_type: ConstructType) -> Result<&dyn TaskExpander, ExpansionError> {
        self.expanders
            .get(&construct_type)
            .map(|expander| expander.as_ref())
            .ok_or(ExpansionError::UnsupportedConstruct(construct_type))
    }

    pub fn registered_types(&self) -> Vec<ConstructType> {
        self.expanders.keys().copied().collect()
    }
}

use serde::{Serialize, Deserialize};
use crate::runtime::ids::IdStrategy;

/// Engine settings, read from YAML; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on loop iterations before the workflow is terminated
    pub max_loop_iterations: u32,
    pub id_strategy: IdStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 1000,
            id_strategy: IdStrategy::Random,
        }
    }
}

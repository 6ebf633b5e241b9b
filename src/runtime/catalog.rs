use std::sync::Arc;
use dashmap::DashMap;
use serde::{Serialize, Deserialize};

/// Catalog entry describing how a named task executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub timeout_seconds: u64,
    /// Max invocations per window, 0 means unlimited
    #[serde(default)]
    pub rate_limit_per_frequency: u32,
    #[serde(default = "default_frequency")]
    pub rate_limit_frequency_in_seconds: u32,
}

fn default_frequency() -> u32 {
    1
}

impl TaskDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            retry_count: 0,
            timeout_seconds: 0,
            rate_limit_per_frequency: 0,
            rate_limit_frequency_in_seconds: default_frequency(),
        }
    }

    pub fn rate_limit(mut self, per_frequency: u32, frequency_in_seconds: u32) -> Self {
        self.rate_limit_per_frequency = per_frequency;
        self.rate_limit_frequency_in_seconds = frequency_in_seconds;
        self
    }
}

// --- Interfaces ---

/// Lookup of task definitions by name.
pub trait TaskDefCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Arc<TaskDefinition>>;
}

// --- In-Memory Implementations ---

pub struct InMemoryCatalog {
    definitions: DashMap<String, Arc<TaskDefinition>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
        }
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TaskDefinition>) -> Self {
        let catalog = Self::new();
        for def in definitions {
            catalog.register(def);
        }
        catalog
    }

    /// Adds or replaces a definition.
    pub fn register(&self, definition: TaskDefinition) {
        self.definitions.insert(definition.name.clone(), Arc::new(definition));
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskDefCatalog for InMemoryCatalog {
    fn lookup(&self, name: &str) -> Option<Arc<TaskDefinition>> {
        self.definitions.get(name).map(|entry| entry.value().clone())
    }
}

use std::cell::Cell;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Strategy for turning the running issue counter into a task id.
pub trait TaskIdAllocator: Send + Sync {
    fn allocate(&self, workflow_id: &str, ordinal: u32) -> String;
}

/// Random v4 UUIDs; the ordinal is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl TaskIdAllocator for RandomIds {
    fn allocate(&self, _workflow_id: &str, _ordinal: u32) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `<workflow_id>-<ordinal>`, reproducible across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIds;

impl TaskIdAllocator for SequentialIds {
    fn allocate(&self, workflow_id: &str, ordinal: u32) -> String {
        format!("{}-{}", workflow_id, ordinal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    Random,
    Sequential,
}

impl IdStrategy {
    pub fn allocator(&self) -> Box<dyn TaskIdAllocator> {
        match self {
            IdStrategy::Random => Box::new(RandomIds),
            IdStrategy::Sequential => Box::new(SequentialIds),
        }
    }
}

/// Running id counter for one decision cycle.
///
/// Starts at the number of tasks the workflow has already issued and is
/// threaded through every (nested) expansion of the cycle.
pub struct IdSequence<'a> {
    workflow_id: &'a str,
    allocator: &'a dyn TaskIdAllocator,
    next: Cell<u32>,
}

impl<'a> IdSequence<'a> {
    pub fn new(workflow_id: &'a str, allocator: &'a dyn TaskIdAllocator, issued: u32) -> Self {
        Self {
            workflow_id,
            allocator,
            next: Cell::new(issued),
        }
    }

    pub fn next_id(&self) -> String {
        let ordinal = self.next.get();
        self.next.set(ordinal + 1);
        self.allocator.allocate(self.workflow_id, ordinal)
    }

    /// How many ids have been handed out, including those issued before
    /// this cycle.
    pub fn issued(&self) -> u32 {
        self.next.get()
    }
}

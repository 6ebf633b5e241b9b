use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::dsl::ConstructType;

/// Lifecycle of a task instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
    Failed,
    Canceled,
    TimedOut,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Scheduled | TaskStatus::InProgress)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

/// A materialized, schedulable unit of work.
///
/// Created once by an expander; afterwards only the runtime touches
/// `status` and `output_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub task_id: String,
    pub construct_type: ConstructType,
    pub definition_name: String,
    /// Runtime name, iteration-qualified for loop bodies (e.g. `T1__2`)
    pub reference_name: String,
    /// Authored reference name of the originating definition node
    pub definition_ref: String,
    pub workflow_instance_id: String,
    pub correlation_id: Option<String>,
    pub workflow_type: String,
    pub scheduled_time: DateTime<Utc>,
    pub iteration: u32,
    pub retry_count: u32,
    pub status: TaskStatus,
    pub rate_limit_per_frequency: u32,
    pub rate_limit_frequency_in_seconds: u32,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub output_data: Value,
}

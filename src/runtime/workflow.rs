use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use uuid::Uuid;
use crate::runtime::task::{TaskInstance, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
    Terminated,
}

/// A running workflow and the task instances it has issued so far.
///
/// Tasks keep insertion order. The reference-name index always points at
/// the latest instance for a name, so a re-issued task supersedes the old
/// one while the old one stays in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "WorkflowRecord")]
pub struct WorkflowInstance {
    pub workflow_id: String,
    pub correlation_id: Option<String>,
    pub workflow_name: String,
    pub workflow_version: u32,
    pub status: WorkflowStatus,
    pub reason_for_incompletion: Option<String>,
    pub input: HashMap<String, Value>,
    tasks: Vec<TaskInstance>,
    #[serde(skip)]
    by_ref: HashMap<String, usize>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

/// Persisted shape of a workflow instance; indexes are rebuilt on load.
#[derive(Deserialize)]
struct WorkflowRecord {
    workflow_id: String,
    #[serde(default)]
    correlation_id: Option<String>,
    workflow_name: String,
    #[serde(default = "first_version")]
    workflow_version: u32,
    status: WorkflowStatus,
    #[serde(default)]
    reason_for_incompletion: Option<String>,
    #[serde(default)]
    input: HashMap<String, Value>,
    #[serde(default)]
    tasks: Vec<TaskInstance>,
}

fn first_version() -> u32 {
    1
}

impl From<WorkflowRecord> for WorkflowInstance {
    fn from(record: WorkflowRecord) -> Self {
        let mut instance = WorkflowInstance {
            workflow_id: record.workflow_id,
            correlation_id: record.correlation_id,
            workflow_name: record.workflow_name,
            workflow_version: record.workflow_version,
            status: record.status,
            reason_for_incompletion: record.reason_for_incompletion,
            input: record.input,
            tasks: Vec::with_capacity(record.tasks.len()),
            by_ref: HashMap::new(),
            by_id: HashMap::new(),
        };
        for task in record.tasks {
            instance.add_task(task);
        }
        instance
    }
}

impl WorkflowInstance {
    pub fn new(workflow_name: &str, workflow_version: u32) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), workflow_name, workflow_version)
    }

    pub fn with_id(workflow_id: impl Into<String>, workflow_name: &str, workflow_version: u32) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            correlation_id: None,
            workflow_name: workflow_name.to_string(),
            workflow_version,
            status: WorkflowStatus::Running,
            reason_for_incompletion: None,
            input: HashMap::new(),
            tasks: Vec::new(),
            by_ref: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn correlation_id(mut self, correlation_id: &str) -> Self {
        self.correlation_id = Some(correlation_id.to_string());
        self
    }

    pub fn input(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.input.insert(key.to_string(), value.into());
        self
    }

    /// Live task for a reference name, qualified names included.
    pub fn task_by_ref(&self, reference_name: &str) -> Option<&TaskInstance> {
        self.by_ref.get(reference_name).map(|&idx| &self.tasks[idx])
    }

    pub fn task_by_id(&self, task_id: &str) -> Option<&TaskInstance> {
        self.by_id.get(task_id).map(|&idx| &self.tasks[idx])
    }

    pub fn tasks(&self) -> &[TaskInstance] {
        &self.tasks
    }

    /// Number of task instances issued so far; seeds the id sequence of the
    /// next decision cycle.
    pub fn issued(&self) -> u32 {
        self.tasks.len() as u32
    }

    /// Persists a task produced by an expander.
    ///
    /// A task whose id is already known replaces that instance in place.
    /// Otherwise it is appended and becomes the live instance for its
    /// reference name.
    pub fn add_task(&mut self, task: TaskInstance) {
        if let Some(&idx) = self.by_id.get(&task.task_id) {
            let old_ref = &self.tasks[idx].reference_name;
            if *old_ref != task.reference_name && self.by_ref.get(old_ref) == Some(&idx) {
                self.by_ref.remove(old_ref);
            }
            self.by_ref.insert(task.reference_name.clone(), idx);
            self.tasks[idx] = task;
            return;
        }

        let idx = self.tasks.len();
        self.by_ref.insert(task.reference_name.clone(), idx);
        self.by_id.insert(task.task_id.clone(), idx);
        self.tasks.push(task);
    }

    pub fn add_tasks(&mut self, tasks: impl IntoIterator<Item = TaskInstance>) {
        for task in tasks {
            self.add_task(task);
        }
    }

    /// Runtime-side status transition. Returns false if no live task has
    /// this reference name.
    pub fn update_status(&mut self, reference_name: &str, status: TaskStatus) -> bool {
        match self.by_ref.get(reference_name) {
            Some(&idx) => {
                self.tasks[idx].status = status;
                true
            }
            None => false,
        }
    }

    /// Runtime-side output write for a live task.
    pub fn set_output(&mut self, reference_name: &str, output: Value) -> bool {
        match self.by_ref.get(reference_name) {
            Some(&idx) => {
                self.tasks[idx].output_data = output;
                true
            }
            None => false,
        }
    }

    /// Marks the whole instance failed after a termination signal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = WorkflowStatus::Failed;
        self.reason_for_incompletion = Some(reason.into());
    }
}

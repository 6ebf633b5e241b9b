pub mod builder;
pub mod loader;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::error::DefinitionError;
use crate::expanders::naming::LOOP_TASK_DELIMITER;

/// Authored workflow definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDef {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_parameters: Vec<String>,
    pub tasks: Vec<DefinitionNode>,
}

fn default_version() -> u32 {
    1
}

impl WorkflowDef {
    /// Finds a node anywhere in the definition, nested bodies included.
    pub fn find_node(&self, reference_name: &str) -> Option<&DefinitionNode> {
        let mut stack: Vec<&DefinitionNode> = self.tasks.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.reference_name == reference_name {
                return Some(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        None
    }

    pub fn first_node(&self) -> Option<&DefinitionNode> {
        self.tasks.first()
    }

    /// Checks the authoring rules the expanders rely on: reference names are
    /// unique and never contain the loop delimiter, loops have a body.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.tasks.is_empty() {
            return Err(DefinitionError::NoTasks(self.name.clone()));
        }

        let mut seen = HashSet::new();
        let mut stack: Vec<&DefinitionNode> = self.tasks.iter().collect();
        while let Some(node) = stack.pop() {
            let reference = &node.reference_name;
            if reference.contains(LOOP_TASK_DELIMITER) {
                return Err(DefinitionError::ReservedDelimiter(reference.clone()));
            }
            if !seen.insert(reference.as_str()) {
                return Err(DefinitionError::DuplicateReference(reference.clone()));
            }
            if let NodeKind::DoWhile { loop_over, .. } = &node.kind {
                if loop_over.is_empty() {
                    return Err(DefinitionError::EmptyLoopBody(reference.clone()));
                }
            }
            stack.extend(node.children());
        }
        Ok(())
    }
}

/// Tag used for expander dispatch and stamped on every task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstructType {
    Leaf,
    Loop,
    Branch,
    FanOut,
    /// Synthesized by the fork/join expander, never authored.
    Join,
    SubWorkflow,
}

impl ConstructType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructType::Leaf => "LEAF",
            ConstructType::Loop => "LOOP",
            ConstructType::Branch => "BRANCH",
            ConstructType::FanOut => "FAN_OUT",
            ConstructType::Join => "JOIN",
            ConstructType::SubWorkflow => "SUB_WORKFLOW",
        }
    }
}

impl fmt::Display for ConstructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the workflow definition graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefinitionNode {
    pub reference_name: String,
    /// Name of the task definition this node is bound to
    pub name: String,
    #[serde(default)]
    pub input_parameters: HashMap<String, Value>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Construct-specific payload of a definition node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Simple,
    DoWhile {
        loop_condition: String,
        loop_over: Vec<DefinitionNode>,
    },
    Decision {
        case_expression: String,
        #[serde(default)]
        decision_cases: BTreeMap<String, Vec<DefinitionNode>>,
        #[serde(default)]
        default_case: Vec<DefinitionNode>,
    },
    ForkJoin {
        fork_tasks: Vec<Vec<DefinitionNode>>,
    },
    SubWorkflow {
        sub_workflow: SubWorkflowParams,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubWorkflowParams {
    pub name: String,
    #[serde(default)]
    pub version: Option<u32>,
}

impl DefinitionNode {
    pub fn construct_type(&self) -> ConstructType {
        match &self.kind {
            NodeKind::Simple => ConstructType::Leaf,
            NodeKind::DoWhile { .. } => ConstructType::Loop,
            NodeKind::Decision { .. } => ConstructType::Branch,
            NodeKind::ForkJoin { .. } => ConstructType::FanOut,
            NodeKind::SubWorkflow { .. } => ConstructType::SubWorkflow,
        }
    }

    /// Direct children in authoring order.
    pub fn children(&self) -> Vec<&DefinitionNode> {
        match &self.kind {
            NodeKind::Simple | NodeKind::SubWorkflow { .. } => Vec::new(),
            NodeKind::DoWhile { loop_over, .. } => loop_over.iter().collect(),
            NodeKind::Decision { decision_cases, default_case, .. } => decision_cases
                .values()
                .flatten()
                .chain(default_case.iter())
                .collect(),
            NodeKind::ForkJoin { fork_tasks } => fork_tasks.iter().flatten().collect(),
        }
    }

    /// The body of a loop node; empty for every other construct.
    pub fn loop_over(&self) -> &[DefinitionNode] {
        match &self.kind {
            NodeKind::DoWhile { loop_over, .. } => loop_over,
            _ => &[],
        }
    }
}

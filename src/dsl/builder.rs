use crate::dsl::{DefinitionNode, NodeKind, SubWorkflowParams, WorkflowDef};
use std::collections::{BTreeMap, HashMap};
use serde_json::Value;

pub struct WorkflowBuilder {
    name: String,
    version: u32,
    description: Option<String>,
    input_parameters: Vec<String>,
    tasks: Vec<DefinitionNode>,
}

impl WorkflowBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: 1,
            description: None,
            input_parameters: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn input_parameter(mut self, name: &str) -> Self {
        self.input_parameters.push(name.to_string());
        self
    }

    pub fn task(mut self, node: DefinitionNode) -> Self {
        self.tasks.push(node);
        self
    }

    pub fn simple(self, reference_name: &str, name: &str) -> Self {
        self.task(simple(reference_name, name))
    }

    pub fn do_while(self, reference_name: &str, name: &str, condition: &str, body: Vec<DefinitionNode>) -> Self {
        self.task(do_while(reference_name, name, condition, body))
    }

    pub fn build(self) -> WorkflowDef {
        WorkflowDef {
            name: self.name,
            version: self.version,
            description: self.description,
            input_parameters: self.input_parameters,
            tasks: self.tasks,
        }
    }
}

// --- Node constructors ---

pub fn simple(reference_name: &str, name: &str) -> DefinitionNode {
    node(reference_name, name, NodeKind::Simple)
}

pub fn do_while(reference_name: &str, name: &str, condition: &str, body: Vec<DefinitionNode>) -> DefinitionNode {
    node(reference_name, name, NodeKind::DoWhile {
        loop_condition: condition.to_string(),
        loop_over: body,
    })
}

pub fn decision(
    reference_name: &str,
    case_expression: &str,
    cases: Vec<(&str, Vec<DefinitionNode>)>,
    default_case: Vec<DefinitionNode>,
) -> DefinitionNode {
    let decision_cases: BTreeMap<String, Vec<DefinitionNode>> = cases
        .into_iter()
        .map(|(case, nodes)| (case.to_string(), nodes))
        .collect();
    node(reference_name, "DECISION", NodeKind::Decision {
        case_expression: case_expression.to_string(),
        decision_cases,
        default_case,
    })
}

pub fn fork_join(reference_name: &str, branches: Vec<Vec<DefinitionNode>>) -> DefinitionNode {
    node(reference_name, "FORK", NodeKind::ForkJoin { fork_tasks: branches })
}

pub fn sub_workflow(reference_name: &str, workflow: &str, version: Option<u32>) -> DefinitionNode {
    node(reference_name, "SUB_WORKFLOW", NodeKind::SubWorkflow {
        sub_workflow: SubWorkflowParams {
            name: workflow.to_string(),
            version,
        },
    })
}

fn node(reference_name: &str, name: &str, kind: NodeKind) -> DefinitionNode {
    DefinitionNode {
        reference_name: reference_name.to_string(),
        name: name.to_string(),
        input_parameters: HashMap::new(),
        kind,
    }
}

impl DefinitionNode {
    /// Adds an input parameter copied into every task created for this node.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.input_parameters.insert(key.to_string(), value.into());
        self
    }
}

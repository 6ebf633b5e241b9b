//! Task-expansion core of a workflow orchestration engine.
//!
//! Turns workflow definition nodes into the task instances a runtime must
//! execute next. One expander per construct type is looked up through
//! [`expanders::ExpanderRegistry`]; [`runtime::decider::Decider`] drives the
//! registry for a running [`runtime::workflow::WorkflowInstance`].

pub mod config;
pub mod dsl;
pub mod error;
pub mod expanders;
pub mod runtime;

pub use config::EngineConfig;
pub use error::{DefinitionError, ExpansionError, RegistryError};

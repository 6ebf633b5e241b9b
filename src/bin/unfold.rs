use clap::{Args, Parser, Subcommand};
use unfold::EngineConfig;
use unfold::dsl::WorkflowDef;
use unfold::dsl::loader::{
    load_catalog_from_yaml, load_config_from_yaml, load_workflow_from_yaml,
    load_workflow_instance_from_json, save_workflow_instance_to_json,
};
use unfold::expanders::naming::{decode, iteration_of, qualify};
use unfold::runtime::catalog::InMemoryCatalog;
use unfold::runtime::decider::{Decider, LoopDecision};
use unfold::runtime::ids::IdStrategy;
use unfold::runtime::workflow::WorkflowInstance;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Result, anyhow};
use tracing::{info, error};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Definitions {
    /// Path to the workflow definition YAML file
    #[arg(long, short)]
    workflow: PathBuf,

    /// Path to the task definition catalog YAML file
    #[arg(long, short)]
    catalog: PathBuf,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine config YAML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use reproducible `<workflow_id>-<n>` task ids
    #[arg(long)]
    sequential_ids: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand one node of a workflow and print the resulting task batch
    Expand {
        #[command(flatten)]
        definitions: Definitions,

        /// Persisted workflow instance (JSON); a fresh instance is used if omitted.
        /// Rewritten with the failure reason if expansion terminates the workflow.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Reference name of the node to expand (defaults to the first node)
        #[arg(long)]
        node: Option<String>,

        /// Requested loop iteration
        #[arg(long, default_value_t = 1)]
        iteration: u32,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Decide what a running loop needs next and print the decision
    Advance {
        #[command(flatten)]
        definitions: Definitions,

        /// Persisted workflow instance (JSON); rewritten if the workflow fails
        #[arg(long)]
        state: PathBuf,

        /// Reference name of the loop to advance
        #[arg(long = "loop")]
        loop_ref: String,

        /// Overrides max_loop_iterations from the config
        #[arg(long)]
        max_loop_iterations: Option<u32>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Print the authored reference name of a runtime task name
    Decode {
        name: String,
    },

    /// Print the iteration-qualified form of a reference name
    Qualify {
        name: String,
        iteration: u32,
    },
}

impl EngineArgs {
    fn load(&self) -> Result<EngineConfig> {
        let mut engine_config = match &self.config {
            Some(path) => load_config_from_yaml(path)?,
            None => EngineConfig::default(),
        };
        if self.sequential_ids {
            engine_config.id_strategy = IdStrategy::Sequential;
        }
        Ok(engine_config)
    }
}

impl Definitions {
    fn load(&self, engine_config: EngineConfig) -> Result<(WorkflowDef, Decider)> {
        let def = load_workflow_from_yaml(&self.workflow)?;
        info!("Loaded workflow: {} v{}", def.name, def.version);

        let definitions = load_catalog_from_yaml(&self.catalog)?;
        info!("Loaded {} task definitions", definitions.len());
        let catalog = Arc::new(InMemoryCatalog::from_definitions(definitions));

        Ok((def, Decider::new(catalog, engine_config)))
    }
}

/// Marks the instance failed and, when it came from disk, writes it back.
fn terminate(instance: &mut WorkflowInstance, state: Option<&Path>, reason: String) -> Result<()> {
    error!(workflow_id = %instance.workflow_id, "Workflow terminated: {}", reason);
    instance.fail(reason);
    if let Some(path) = state {
        save_workflow_instance_to_json(instance, path)?;
        info!("Saved failed workflow state to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand { definitions, state, node, iteration, engine } => {
            let (def, decider) = definitions.load(engine.load()?)?;

            let mut instance = match &state {
                Some(path) => load_workflow_instance_from_json(path)?,
                None => WorkflowInstance::new(&def.name, def.version),
            };

            let target = match &node {
                Some(reference) => def.find_node(reference)
                    .ok_or_else(|| anyhow!("Node not found: {}", reference))?,
                None => def.first_node()
                    .ok_or_else(|| anyhow!("Workflow {} has no tasks", def.name))?,
            };

            match decider.schedule_at(&instance, target, iteration) {
                Ok(tasks) => {
                    info!("Expanded {} into {} tasks", target.reference_name, tasks.len());
                    println!("{}", serde_json::to_string_pretty(&tasks)?);
                }
                Err(e) => {
                    terminate(&mut instance, state.as_deref(), e.reason())?;
                    return Err(e.into());
                }
            }
        }

        Commands::Advance { definitions, state, loop_ref, max_loop_iterations, engine } => {
            let mut engine_config = engine.load()?;
            if let Some(max) = max_loop_iterations {
                engine_config.max_loop_iterations = max;
            }
            let (def, decider) = definitions.load(engine_config)?;
            let mut instance = load_workflow_instance_from_json(&state)?;

            match decider.advance_loop(&def, &instance, &loop_ref) {
                Ok(decision) => {
                    info!("Advanced loop {}", loop_ref);
                    println!("{}", serde_json::to_string_pretty(&decision)?);
                    if let LoopDecision::Failed(reason) = decision {
                        terminate(&mut instance, Some(state.as_path()), reason)?;
                    }
                }
                Err(e) => {
                    terminate(&mut instance, Some(state.as_path()), e.reason())?;
                    return Err(e.into());
                }
            }
        }

        Commands::Decode { name } => {
            if let Some(iteration) = iteration_of(&name) {
                info!("{} was issued in iteration {}", name, iteration);
            }
            println!("{}", decode(&name));
        }

        Commands::Qualify { name, iteration } => {
            println!("{}", qualify(&name, iteration));
        }
    }

    Ok(())
}

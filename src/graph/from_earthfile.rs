//! Earthfile-to-graph conversion.

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::ast::{Block, Earthfile, Statement, Target};
use crate::extract::{Classification, classify_and_extract};

use super::model::{DependencyGraph, GraphError};

impl DependencyGraph {
    /// Build the dependency graph of every target in `earthfile`.
    ///
    /// The base recipe and user-defined functions are not graph nodes and are
    /// not visited.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnrecognizedCommand`] when any target uses an
    /// instruction outside the known vocabulary.
    pub fn from_earthfile(earthfile: &Earthfile) -> Result<Self, GraphError> {
        Self::build(&earthfile.targets)
    }

    /// Build the dependency graph of `targets`.
    ///
    /// Every target receives an entry, even when it references nothing. A
    /// name declared twice keeps a single entry holding the union of both
    /// recipes' dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnrecognizedCommand`] for the first unknown
    /// instruction. No partial graph is produced.
    pub fn build(targets: &[Target]) -> Result<Self, GraphError> {
        let mut graph = Self::default();
        for target in targets {
            let deps = target_dependencies(target)?;
            debug!(owner = %target.name, dependencies = deps.len(), "resolved target");
            graph.entry(&target.name).extend(deps);
        }
        Ok(graph)
    }
}

/// Collect the dependencies of a single target.
///
/// Commands nested in `WAIT`, `FOR`, and every `IF` branch are attributed to
/// `target`.
///
/// # Errors
///
/// Returns [`GraphError::UnrecognizedCommand`] when the recipe uses an
/// unknown instruction.
pub fn target_dependencies(target: &Target) -> Result<IndexSet<String>, GraphError> {
    let mut deps = IndexSet::new();
    visit_block(&target.name, &target.recipe, &mut deps)?;
    Ok(deps)
}

fn visit_block(
    owner: &str,
    block: &Block,
    deps: &mut IndexSet<String>,
) -> Result<(), GraphError> {
    for statement in block {
        match statement {
            Statement::Command(command) => {
                match classify_and_extract(&command.name, &command.args) {
                    Classification::NoDependency => {}
                    Classification::Dependencies(found) => {
                        trace!(owner, command = %command.name, ?found, "dependencies");
                        deps.extend(found);
                    }
                    Classification::UnrecognizedCommand(name) => {
                        return Err(GraphError::UnrecognizedCommand {
                            target: owner.to_owned(),
                            command: name,
                        });
                    }
                }
            }
            Statement::Wait(wait) => visit_block(owner, &wait.body, deps)?,
            Statement::For(for_block) => visit_block(owner, &for_block.body, deps)?,
            Statement::If(if_block) => {
                for branch in if_block.branches() {
                    visit_block(owner, branch, deps)?;
                }
            }
        }
    }
    Ok(())
}

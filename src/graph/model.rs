//! Graph storage and error types.

use indexmap::{IndexMap, IndexSet};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Directed graph from each target to the targets it depends on.
///
/// Keys keep declaration order and each edge set keeps discovery order, so
/// rendering is stable across runs. Equality ignores both orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    pub(super) edges: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    /// Ensure `name` has an entry, returning its edge set.
    pub(super) fn entry(&mut self, name: &str) -> &mut IndexSet<String> {
        self.edges.entry(name.to_owned()).or_default()
    }

    /// Names of every declared target, in declaration order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Dependencies of `target`, or `None` when it was not declared.
    #[must_use]
    pub fn dependencies_of(&self, target: &str) -> Option<&IndexSet<String>> {
        self.edges.get(target)
    }

    /// Every `(source, dependency)` pair in graph order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().flat_map(|(source, deps)| {
            deps.iter()
                .map(move |dep| (source.as_str(), dep.as_str()))
        })
    }

    /// Whether `source` depends directly on `dependency`.
    #[must_use]
    pub fn contains_edge(&self, source: &str, dependency: &str) -> bool {
        self.edges
            .get(source)
            .is_some_and(|deps| deps.contains(dependency))
    }

    /// Number of targets in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of edges across all targets.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexSet::len).sum()
    }
}

impl<S, I> FromIterator<(S, I)> for DependencyGraph
where
    S: Into<String>,
    I: IntoIterator,
    I::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        let mut graph = Self::default();
        for (source, deps) in iter {
            let source: String = source.into();
            graph.entry(&source).extend(deps.into_iter().map(Into::into));
        }
        graph
    }
}

/// Errors produced while building a [`DependencyGraph`].
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum GraphError {
    /// A recipe used an instruction outside the known vocabulary.
    #[error("unrecognised command `{command}` in target `{target}`")]
    #[diagnostic(
        code(earthgraph::graph::unrecognised_command),
        help("supported commands are listed in earthgraph::extract")
    )]
    UnrecognizedCommand {
        /// Target whose recipe contains the command.
        target: String,
        /// The offending instruction name.
        command: String,
    },
}

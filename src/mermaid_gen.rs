//! Mermaid flowchart generator.
//!
//! This module converts a [`crate::graph::DependencyGraph`] into a top-down
//! Mermaid flowchart. Edges are emitted in graph order: targets in
//! declaration order, dependencies in the order they were first referenced.

use crate::graph::DependencyGraph;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// First line of every generated flowchart.
pub const HEADER: &str = "graph TD";

/// Generate a Mermaid flowchart as a string.
///
/// ```rust
/// use earthgraph::graph::DependencyGraph;
/// use earthgraph::mermaid_gen::generate;
///
/// let graph: DependencyGraph = [("A", vec!["B"]), ("B", vec![])].into_iter().collect();
/// assert_eq!(generate(&graph), "graph TD\n\tA --> B\n");
/// ```
#[must_use]
pub fn generate(graph: &DependencyGraph) -> String {
    Flowchart(graph).to_string()
}

/// Wrapper struct to display a whole graph.
struct Flowchart<'a>(&'a DependencyGraph);

impl Display for Flowchart<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        self.0
            .edges()
            .try_for_each(|(source, dependency)| write!(f, "{}", DisplayEdge { source, dependency }))
    }
}

/// Wrapper struct to display a single edge.
struct DisplayEdge<'a> {
    source: &'a str,
    dependency: &'a str,
}

impl Display for DisplayEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t{} --> {}", self.source, self.dependency)
    }
}

/// Summarise a graph on one line for log output.
#[must_use]
pub fn summary(graph: &DependencyGraph) -> String {
    format!(
        "{} targets, {} edges: {}",
        graph.len(),
        graph.edge_count(),
        graph.targets().join(", ")
    )
}

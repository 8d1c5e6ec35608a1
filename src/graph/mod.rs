//! Target dependency graph.
//!
//! [`DependencyGraph`] maps every declared target to the set of targets its
//! recipe references. Nested `IF`, `FOR`, and `WAIT` blocks never introduce
//! nodes of their own; edges found inside them belong to the enclosing
//! target.
//!
//! # Examples
//!
//! ```
//! use earthgraph::ast::{Command, Statement, Target};
//! use earthgraph::graph::DependencyGraph;
//!
//! let targets = vec![
//!     Target::new("a", vec![Statement::Command(Command::new("COPY", ["+b/output", "./"]))]),
//!     Target::new("b", vec![Statement::Command(Command::new("RUN", ["echo", "hi"]))]),
//! ];
//! let graph = DependencyGraph::build(&targets).expect("known commands");
//! assert!(graph.contains_edge("a", "b"));
//! assert_eq!(graph.dependencies_of("b").map(|deps| deps.len()), Some(0));
//! ```

mod from_earthfile;
mod model;

pub use from_earthfile::target_dependencies;
pub use model::{DependencyGraph, GraphError};

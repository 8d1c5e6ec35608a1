//! Earthgraph core library.
//!
//! This library parses Earthfiles into an [`ast::Earthfile`], extracts the
//! target dependency graph with [`graph::DependencyGraph`], and renders it
//! as a Mermaid flowchart with [`mermaid_gen`].

pub mod ast;
pub mod cli;
pub mod earthfile;
pub mod extract;
pub mod graph;
pub mod mermaid_gen;
pub mod runner;

//! CLI execution logic.
//!
//! This module keeps `main` minimal: it loads the Earthfile named on the
//! command line, builds its dependency graph, and writes the Mermaid
//! flowchart. Nothing is written unless the whole graph could be built.

use crate::cli::Cli;
use crate::{earthfile, graph::DependencyGraph, mermaid_gen};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Execute the parsed [`Cli`], writing the flowchart to standard output.
///
/// # Errors
///
/// Returns an error if the Earthfile cannot be loaded, uses an unknown
/// command, or the output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_with_writer(cli, &mut handle)
}

/// Execute the parsed [`Cli`], writing the flowchart to `out`.
///
/// # Errors
///
/// Returns an error if the Earthfile cannot be loaded, uses an unknown
/// command, or writing to `out` fails.
pub fn run_with_writer(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let chart = generate_mermaid(&cli.file)?;
    out.write_all(chart.as_bytes())
        .context("writing flowchart")?;
    out.flush().context("flushing flowchart")
}

/// Generate the Mermaid flowchart for the Earthfile at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or the graph cannot be
/// built.
///
/// # Examples
/// ```rust
/// use earthgraph::runner::generate_mermaid;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = dir.path().join("Earthfile");
/// std::fs::write(&path, "A:\n    COPY +B/out ./\nB:\n    RUN true\n").expect("write");
/// let chart = generate_mermaid(&path).expect("generate");
/// assert_eq!(chart, "graph TD\n\tA --> B\n");
/// ```
pub fn generate_mermaid(path: &Path) -> Result<String> {
    let earthfile = earthfile::from_path(path).context("failed to parse file")?;
    let graph = DependencyGraph::from_earthfile(&earthfile).context("building graph")?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let graph_json = serde_json::to_string_pretty(&graph).context("serialising graph")?;
        debug!("graph:\n{graph_json}");
    }
    info!("{}", mermaid_gen::summary(&graph));
    Ok(mermaid_gen::generate(&graph))
}

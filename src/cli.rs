//! Command line interface definition using clap.
//!
//! The tool takes exactly one positional argument, the Earthfile to analyse.
//! Argument errors are reported with the usage text on standard output and a
//! non-zero exit status.

use clap::Parser;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

/// Render the target dependency graph of an Earthfile as a Mermaid flowchart.
#[derive(Debug, Parser, PartialEq, Eq, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the Earthfile (or its JSON AST) to analyse.
    #[arg(value_name = "FILENAME")]
    pub file: PathBuf,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Result of interpreting the command line.
#[derive(Debug)]
pub enum Invocation {
    /// Arguments were valid.
    Run(Cli),
    /// `--help` or `--version` was requested; print the text and succeed.
    Info(String),
    /// Arguments were invalid; print the usage text and fail.
    Usage(String),
}

impl Cli {
    /// Interpret the provided arguments without exiting the process.
    ///
    /// The first item is the program name.
    ///
    /// ```rust
    /// use earthgraph::cli::{Cli, Invocation};
    /// assert!(matches!(Cli::interpret(["earthgraph", "Earthfile"]), Invocation::Run(_)));
    /// assert!(matches!(Cli::interpret(["earthgraph"]), Invocation::Usage(_)));
    /// ```
    #[must_use]
    pub fn interpret<I, T>(args: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Invocation::Run(cli),
            Err(err) if err.use_stderr() => Invocation::Usage(err.render().to_string()),
            Err(err) => Invocation::Info(err.render().to_string()),
        }
    }
}

/// Write help or usage `text` to `out` and return the exit status to use.
///
/// Logging is configured only after arguments parse, so a failed write is
/// reported through the returned status (1) rather than a log line.
///
/// ```rust
/// let mut out = Vec::new();
/// assert_eq!(earthgraph::cli::write_message(&mut out, "Usage: earthgraph\n", 0), 0);
/// assert_eq!(out, b"Usage: earthgraph\n");
/// ```
#[must_use]
pub fn write_message(out: &mut impl Write, text: &str, status: u8) -> u8 {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_or(1, |()| status)
}

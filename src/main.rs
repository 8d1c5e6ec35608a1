//! Application entry point.
//!
//! Interprets command-line arguments and delegates execution to
//! [`runner::run`].

use earthgraph::{
    cli::{self, Cli, Invocation},
    runner,
};
use std::io;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn write_stdout(text: &str, status: u8) -> ExitCode {
    ExitCode::from(cli::write_message(&mut io::stdout().lock(), text, status))
}

fn main() -> ExitCode {
    let cli = match Cli::interpret(std::env::args_os()) {
        Invocation::Run(cli) => cli,
        Invocation::Info(text) => return write_stdout(&text, 0),
        Invocation::Usage(text) => return write_stdout(&text, 1),
    };
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "earthgraph failed");
            ExitCode::FAILURE
        }
    }
}

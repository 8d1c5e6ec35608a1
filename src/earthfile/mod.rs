//! Earthfile loading helpers.
//!
//! Two input forms are accepted. Earthfile text is split into logical lines
//! and parsed into the [`Earthfile`] AST without evaluating `ARG`s,
//! conditions, or imports. A document whose first non-whitespace character
//! is `{` is treated as the JSON AST emitted by `earthly` and deserialised
//! directly.

use crate::ast::Earthfile;
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::debug;

mod diagnostics;
mod lexer;
mod parser;

pub use diagnostics::EarthfileError;

/// Display name used when parsing a string without a path.
pub const DEFAULT_NAME: &str = "Earthfile";

fn looks_like_json(src: &str) -> bool {
    src.trim_start().starts_with('{')
}

/// Parse an Earthfile from a string.
///
/// # Errors
///
/// Returns [`EarthfileError::Parse`] if the text or JSON is malformed.
///
/// ```rust
/// let earthfile = earthgraph::earthfile::from_str("a:\n    BUILD +b\nb:\n    RUN true\n")
///     .expect("valid Earthfile");
/// assert_eq!(earthfile.targets.len(), 2);
/// ```
pub fn from_str(src: &str) -> Result<Earthfile, EarthfileError> {
    from_str_named(src, DEFAULT_NAME)
}

/// Parse an Earthfile from a string, labelling diagnostics with `name`.
///
/// # Errors
///
/// Returns [`EarthfileError::Parse`] if the text or JSON is malformed.
pub fn from_str_named(src: &str, name: &str) -> Result<Earthfile, EarthfileError> {
    let parsed: Result<Earthfile, _> = if looks_like_json(src) {
        debug!(source = name, "parsing JSON AST");
        serde_json::from_str(src).map_err(|err| diagnostics::map_json_error(err, src, name))
    } else {
        debug!(source = name, "parsing Earthfile text");
        parser::parse(src).map_err(|err| diagnostics::map_syntax_error(err, src, name))
    };
    parsed.map_err(|source| EarthfileError::Parse {
        name: name.to_owned(),
        source,
    })
}

/// Load an [`Earthfile`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Path>) -> Result<Earthfile> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read {}", path_ref.display()))?;
    Ok(from_str_named(&data, &path_ref.display().to_string())?)
}

#[cfg(test)]
mod tests;

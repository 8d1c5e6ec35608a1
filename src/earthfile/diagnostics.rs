//! Translates Earthfile parsing errors into actionable diagnostics.
//!
//! Both loaders report failures as [`EarthfileError::Parse`] wrapping a
//! [`miette`] diagnostic that carries the source text, a span pointing at the
//! offending line, and a stable diagnostic code.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Byte range within the Earthfile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Span {
    pub(crate) const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        Self::from((span.offset, span.len))
    }
}

/// Error raised when an Earthfile cannot be turned into an AST.
#[derive(Debug, Error, Diagnostic)]
pub enum EarthfileError {
    /// Parsing failed and produced the supplied diagnostic.
    #[error("failed to parse {name}")]
    #[diagnostic(code(earthgraph::earthfile::parse))]
    Parse {
        /// Display name of the source, usually its path.
        name: String,
        /// Underlying diagnostic reported by the text or JSON loader.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },
}

/// A syntax error found by the text loader, before it is attached to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub(crate) message: String,
    pub(crate) help: Option<&'static str>,
    pub(crate) span: Span,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            help: None,
            span,
        }
    }

    pub(crate) const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(earthgraph::earthfile::syntax))]
struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("syntax error here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(earthgraph::earthfile::json))]
struct JsonDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[source]
    source: serde_json::Error,
    message: String,
}

/// Convert a byte offset into one-based line and column numbers.
pub(crate) fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let before = src.get(..offset).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before.get(line_start..).map_or(0, |s| s.chars().count()) + 1;
    (line, column)
}

/// Reconstruct the byte offset of a one-based line and column.
///
/// Offsets past the end of a line clamp to the line end, and both `\n` and
/// `\r\n` newlines are accepted.
pub(crate) fn byte_index(src: &str, line: usize, column: usize) -> usize {
    let target_line = line.saturating_sub(1);
    let target_column = column.saturating_sub(1);
    let mut offset = 0usize;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == target_line {
            let without_newline = segment.strip_suffix('\n').unwrap_or(segment);
            let cleaned_line = without_newline
                .strip_suffix('\r')
                .unwrap_or(without_newline);
            let column_offset = cleaned_line
                .char_indices()
                .nth(target_column)
                .map_or(cleaned_line.len(), |(byte_idx, _)| byte_idx);
            return offset + column_offset;
        }
        offset += segment.len();
    }
    src.len()
}

/// Attach a [`SyntaxError`] to its source text.
pub(crate) fn map_syntax_error(
    err: SyntaxError,
    src: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let (line, col) = line_column(src, err.span.offset);
    Box::new(SyntaxDiagnostic {
        src: NamedSource::new(name, src.to_owned()),
        span: err.span.into(),
        help: err.help.map(str::to_owned),
        message: format!("{} at line {line}, column {col}", err.message),
    })
}

/// Map a `serde_json` error from the JSON AST loader into a diagnostic.
pub(crate) fn map_json_error(
    err: serde_json::Error,
    src: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let (line, col) = (err.line(), err.column());
    let span = (line > 0).then(|| {
        let at = byte_index(src, line, col.max(1));
        SourceSpan::from((at, usize::from(at < src.len())))
    });
    let message = format!("JSON parse error at line {line}, column {col}: {err}");
    Box::new(JsonDiagnostic {
        src: NamedSource::new(name, src.to_owned()),
        span,
        source: err,
        message,
    })
}

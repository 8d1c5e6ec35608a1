//! Logical line splitting for Earthfile text.
//!
//! Blank lines and `#` comment lines are dropped. A trailing backslash joins
//! the next physical line, and every logical line remembers whether it was
//! indented and where it starts in the source.

use super::diagnostics::Span;

/// One logical Earthfile line with continuations already joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    pub(crate) text: String,
    pub(crate) indented: bool,
    pub(crate) span: Span,
}

pub(crate) fn logical_lines(src: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    let mut offset = 0usize;
    for raw in src.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let content = raw.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            lines.extend(pending.take());
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        let (body, continues) = trimmed
            .strip_suffix('\\')
            .map_or((trimmed, false), |body| (body.trim_end(), true));
        let line = pending.get_or_insert_with(|| LogicalLine {
            text: String::new(),
            indented: content.starts_with([' ', '\t']),
            span: Span::new(start + content.len() - content.trim_start().len(), 0),
        });
        if !line.text.is_empty() && !body.is_empty() {
            line.text.push(' ');
        }
        line.text.push_str(body);
        line.span.len = (start + content.trim_end().len()).saturating_sub(line.span.offset);
        if !continues {
            lines.extend(pending.take());
        }
    }
    lines.extend(pending);
    lines
}

//! Recursive block parser for Earthfile text.
//!
//! The parser consumes [`LogicalLine`]s and builds the [`Earthfile`] AST.
//! Control blocks (`IF`, `FOR`, `WAIT`) recurse until their `END`; every other
//! keyword becomes a [`Command`]. Instruction names are not validated here.

use crate::ast::{
    Block, Command, Earthfile, ElseIf, ForBlock, Function, IfBlock, Statement, Target, Version,
    WaitBlock,
};

use super::diagnostics::{Span, SyntaxError};
use super::lexer::{LogicalLine, logical_lines};

/// Instructions spelled with two keywords.
const TWO_WORD_COMMANDS: [(&str, &str); 4] = [
    ("SAVE", "ARTIFACT"),
    ("SAVE", "IMAGE"),
    ("FROM", "DOCKERFILE"),
    ("GIT", "CLONE"),
];

/// Markers that turn a block into a user-defined function.
const FUNCTION_MARKERS: [&str; 2] = ["FUNCTION", "COMMAND"];

const UNSUPPORTED_BLOCKS: [&str; 4] = ["WITH", "TRY", "CATCH", "FINALLY"];

/// Whether recipe lines must be indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Base,
    Recipe,
}

/// Why [`Parser::parse_block`] stopped.
#[derive(Debug)]
enum BlockEnd {
    Eof,
    TargetHeader,
    End(Span),
    Else(Span),
    ElseIf(Vec<String>, Span),
}

/// Parse Earthfile text into its AST.
pub(crate) fn parse(src: &str) -> Result<Earthfile, SyntaxError> {
    Parser::new(logical_lines(src)).parse_earthfile()
}

/// Return the name declared by a `name:` header line.
fn target_header(text: &str) -> Option<&str> {
    let name = text.strip_suffix(':')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid_first = first.is_ascii_alphanumeric() || first == '_';
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    (valid_first && valid_rest).then_some(name)
}

/// Escape every unquoted `#` that starts a word.
///
/// `shlex` reads such a `#` as a shell comment and drops the rest of the line,
/// whereas Earthfile comments only ever occupy a whole line.
fn escape_word_hashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut word_start = true;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else {
            match quote {
                Some(open) if c == open => quote = None,
                Some('"') if c == '\\' => escaped = true,
                Some(_) => {}
                None => match c {
                    '\\' => escaped = true,
                    '\'' | '"' => quote = Some(c),
                    '#' if word_start => out.push('\\'),
                    _ => {}
                },
            }
        }
        word_start = quote.is_none() && !escaped && c.is_whitespace();
        out.push(c);
    }
    out
}

fn split_words(line: &LogicalLine) -> Result<Vec<String>, SyntaxError> {
    shlex::split(&escape_word_hashes(&line.text)).ok_or_else(|| {
        SyntaxError::new("unbalanced quotes in command", line.span)
            .with_help("close the quoted argument or escape the quote character")
    })
}

/// Parse the bracketed exec form, for example `RUN ["echo", "hi"]`.
fn exec_form_args(line: &LogicalLine, keyword: &str) -> Option<Vec<String>> {
    let rest = line.text.trim_start().strip_prefix(keyword)?.trim();
    if !(rest.starts_with('[') && rest.ends_with(']')) {
        return None;
    }
    serde_json::from_str(rest).ok()
}

fn command_from_words(line: &LogicalLine, keyword: &str, rest: &[String]) -> Command {
    if let Some((second, args)) = rest.split_first() {
        let two_word = TWO_WORD_COMMANDS
            .iter()
            .any(|(first, next)| *first == keyword && *next == second.as_str());
        if two_word {
            return Command::new(format!("{keyword} {second}"), args.iter().cloned());
        }
    }
    exec_form_args(line, keyword).map_or_else(
        || Command::new(keyword, rest.iter().cloned()),
        |args| Command {
            name: keyword.to_owned(),
            args,
            exec_mode: true,
        },
    )
}

fn unterminated(keyword: &str, open: Span) -> SyntaxError {
    SyntaxError::new(format!("unterminated {keyword} block"), open)
        .with_help("close the block with END")
}

fn stray(end: &BlockEnd) -> Option<SyntaxError> {
    match end {
        BlockEnd::End(span) => Some(
            SyntaxError::new("END without a matching IF, FOR, or WAIT", *span)
                .with_help("remove the END or open a block before it"),
        ),
        BlockEnd::Else(span) | BlockEnd::ElseIf(_, span) => {
            Some(SyntaxError::new("ELSE without a matching IF", *span))
        }
        BlockEnd::Eof | BlockEnd::TargetHeader => None,
    }
}

/// Accept only `END` as the terminator of a `FOR` or `WAIT` body.
fn expect_end(end: &BlockEnd, keyword: &str, open: Span) -> Result<(), SyntaxError> {
    match end {
        BlockEnd::End(_) => Ok(()),
        BlockEnd::Eof | BlockEnd::TargetHeader => Err(unterminated(keyword, open)),
        BlockEnd::Else(span) | BlockEnd::ElseIf(_, span) => Err(SyntaxError::new(
            format!("ELSE inside {keyword} without a matching IF"),
            *span,
        )),
    }
}

/// Remove a leading command named one of `names`, returning its arguments.
fn take_leading_command(block: &mut Block, names: &[&str]) -> Option<Vec<String>> {
    let is_marker = matches!(
        block.first(),
        Some(Statement::Command(command)) if names.contains(&command.name.as_str())
    );
    if !is_marker {
        return None;
    }
    match block.remove(0) {
        Statement::Command(command) => Some(command.args),
        Statement::Wait(_) | Statement::For(_) | Statement::If(_) => None,
    }
}

struct Parser {
    lines: Vec<LogicalLine>,
    pos: usize,
}

impl Parser {
    const fn new(lines: Vec<LogicalLine>) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&LogicalLine> {
        self.lines.get(self.pos)
    }

    fn parse_earthfile(mut self) -> Result<Earthfile, SyntaxError> {
        let mut earthfile = Earthfile::default();
        let (mut base, end) = self.parse_block(Scope::Base)?;
        if let Some(err) = stray(&end) {
            return Err(err);
        }
        earthfile.version =
            take_leading_command(&mut base, &["VERSION"]).map(|args| Version { args });
        earthfile.base_recipe = base;

        while let Some(line) = self.peek() {
            let Some(name) = target_header(&line.text).map(str::to_owned) else {
                break;
            };
            self.pos += 1;
            let (mut recipe, end) = self.parse_block(Scope::Recipe)?;
            if let Some(err) = stray(&end) {
                return Err(err);
            }
            if take_leading_command(&mut recipe, &FUNCTION_MARKERS).is_some() {
                earthfile.functions.push(Function { name, recipe });
            } else {
                earthfile.targets.push(Target::new(name, recipe));
            }
        }
        Ok(earthfile)
    }

    fn parse_block(&mut self, scope: Scope) -> Result<(Block, BlockEnd), SyntaxError> {
        let mut block = Vec::new();
        while let Some(line) = self.peek() {
            if !line.indented && target_header(&line.text).is_some() {
                return Ok((block, BlockEnd::TargetHeader));
            }
            if scope == Scope::Recipe && !line.indented {
                return Err(SyntaxError::new("recipe lines must be indented", line.span)
                    .with_help("indent commands under their target declaration"));
            }
            let line = line.clone();
            self.pos += 1;
            let words = split_words(&line)?;
            let Some((keyword, rest)) = words.split_first() else {
                continue;
            };
            match keyword.as_str() {
                "END" => return Ok((block, BlockEnd::End(line.span))),
                "ELSE" => {
                    let end = match rest.split_first() {
                        Some((next, expression)) if next == "IF" => {
                            BlockEnd::ElseIf(expression.to_vec(), line.span)
                        }
                        _ => BlockEnd::Else(line.span),
                    };
                    return Ok((block, end));
                }
                "IF" => {
                    let if_block = self.parse_if(rest.to_vec(), line.span, scope)?;
                    block.push(Statement::If(if_block));
                }
                "FOR" => {
                    let (body, end) = self.parse_block(scope)?;
                    expect_end(&end, "FOR", line.span)?;
                    block.push(Statement::For(ForBlock {
                        args: rest.to_vec(),
                        body,
                    }));
                }
                "WAIT" => {
                    let (body, end) = self.parse_block(scope)?;
                    expect_end(&end, "WAIT", line.span)?;
                    block.push(Statement::Wait(WaitBlock {
                        args: rest.to_vec(),
                        body,
                    }));
                }
                other if UNSUPPORTED_BLOCKS.contains(&other) => {
                    return Err(SyntaxError::new(
                        format!("{other} blocks are not supported"),
                        line.span,
                    ));
                }
                other => block.push(Statement::Command(command_from_words(&line, other, rest))),
            }
        }
        Ok((block, BlockEnd::Eof))
    }

    fn parse_if(
        &mut self,
        expression: Vec<String>,
        open: Span,
        scope: Scope,
    ) -> Result<IfBlock, SyntaxError> {
        let (if_body, mut end) = self.parse_block(scope)?;
        let mut if_block = IfBlock {
            expression,
            if_body,
            ..IfBlock::default()
        };
        loop {
            end = match end {
                BlockEnd::End(_) => return Ok(if_block),
                BlockEnd::Eof | BlockEnd::TargetHeader => return Err(unterminated("IF", open)),
                BlockEnd::ElseIf(_, span) | BlockEnd::Else(span) if if_block.else_body.is_some() => {
                    return Err(SyntaxError::new("ELSE branch after the final ELSE", span)
                        .with_help("move this branch before the plain ELSE"));
                }
                BlockEnd::ElseIf(expression, _) => {
                    let (body, next) = self.parse_block(scope)?;
                    if_block.else_if.push(ElseIf { expression, body });
                    next
                }
                BlockEnd::Else(_) => {
                    let (body, next) = self.parse_block(scope)?;
                    if_block.else_body = Some(body);
                    next
                }
            };
        }
    }
}

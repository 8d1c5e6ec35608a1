//! Earthfile Abstract Syntax Tree structures.
//!
//! This module defines the data structures used to represent a parsed
//! `Earthfile`. The serde field names mirror the JSON AST printed by
//! `earthly`, so the same types serve both the text loader and the JSON
//! loader in [`crate::earthfile`].
//!
//! The following example parses a minimal JSON AST:
//!
//! ```rust
//! use earthgraph::ast::{Earthfile, Statement};
//!
//! let json = r#"{"targets":[{"name":"build","recipe":[
//!     {"command":{"name":"COPY","args":["+deps/out","./"]}}
//! ]}]}"#;
//! let earthfile: Earthfile = serde_json::from_str(json).expect("parse");
//! assert_eq!(earthfile.targets[0].name, "build");
//! assert!(matches!(earthfile.targets[0].recipe[0], Statement::Command(_)));
//! ```

use serde::{Deserialize, Serialize, de::Deserializer};

/// An ordered sequence of recipe items.
pub type Block = Vec<Statement>;

/// Read `null` as the default value; `earthly` writes empty lists as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Top-level structure parsed from an `Earthfile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Earthfile {
    /// Arguments of the `VERSION` statement, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// Statements declared before the first target.
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_recipe: Block,

    /// Targets in declaration order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<Target>,

    /// User-defined `FUNCTION` blocks. These are not graph nodes.
    #[serde(
        default,
        rename = "userCommands",
        alias = "functions",
        deserialize_with = "null_as_default"
    )]
    pub functions: Vec<Function>,
}

/// The `VERSION` statement of an `Earthfile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    /// Raw arguments, for example `["--use-cache-command", "0.7"]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
}

/// A named, independently buildable unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Target {
    /// Target name as written before the colon.
    pub name: String,
    /// Ordered instructions that build the target.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipe: Block,
}

impl Target {
    /// Construct a target from a name and recipe.
    #[must_use]
    pub fn new(name: impl Into<String>, recipe: Block) -> Self {
        Self {
            name: name.into(),
            recipe,
        }
    }
}

/// A user-defined command declared with `FUNCTION` (or the older `COMMAND`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Function {
    /// Function name as written before the colon.
    pub name: String,
    /// Body of the function, excluding the leading `FUNCTION` marker.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipe: Block,
}

/// A single recipe item.
///
/// Exactly one variant is present. In the JSON AST the variant is selected by
/// which of `command`, `wait`, `for`, or `if` is set; `with` and `try`
/// statements are rejected because their semantics are not modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Statement {
    /// A build instruction such as `RUN` or `COPY`.
    Command(Command),
    /// A `WAIT ... END` block.
    Wait(WaitBlock),
    /// A `FOR ... END` loop.
    For(ForBlock),
    /// An `IF ... END` conditional.
    If(IfBlock),
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawStatement {
            command: Option<Command>,
            wait: Option<WaitBlock>,
            #[serde(rename = "for")]
            for_block: Option<ForBlock>,
            #[serde(rename = "if")]
            if_block: Option<IfBlock>,
            with: Option<serde::de::IgnoredAny>,
            #[serde(rename = "try")]
            try_block: Option<serde::de::IgnoredAny>,
        }

        let raw = RawStatement::deserialize(deserializer)?;
        if raw.with.is_some() || raw.try_block.is_some() {
            return Err(serde::de::Error::custom(
                "WITH and TRY statements are not supported",
            ));
        }
        match (raw.command, raw.wait, raw.for_block, raw.if_block) {
            (Some(command), None, None, None) => Ok(Self::Command(command)),
            (None, Some(wait), None, None) => Ok(Self::Wait(wait)),
            (None, None, Some(for_block), None) => Ok(Self::For(for_block)),
            (None, None, None, Some(if_block)) => Ok(Self::If(if_block)),
            (None, None, None, None) => Err(serde::de::Error::custom(
                "missing one of command, wait, for, or if",
            )),
            _ => Err(serde::de::Error::custom(
                "fields command, wait, for, and if are mutually exclusive",
            )),
        }
    }
}

/// A build instruction with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Instruction name, for example `COPY` or `SAVE ARTIFACT`.
    pub name: String,
    /// Arguments in source order, excluding the instruction name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
    /// Whether the instruction used the bracketed exec form.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exec_mode: bool,
}

impl Command {
    /// Construct a command from a name and arguments.
    ///
    /// ```rust
    /// use earthgraph::ast::Command;
    /// let copy = Command::new("COPY", ["+deps/out", "./"]);
    /// assert_eq!(copy.args, vec!["+deps/out", "./"]);
    /// ```
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            exec_mode: false,
        }
    }
}

/// Commands grouped for parallel execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WaitBlock {
    /// Flags passed to `WAIT`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
    /// Nested recipe.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Block,
}

/// A loop over a list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForBlock {
    /// Loop header, for example `["f", "IN", "a", "b"]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
    /// Loop body.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Block,
}

/// A conditional with optional `ELSE IF` and `ELSE` branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfBlock {
    /// Condition tokens following `IF`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: Vec<String>,
    /// Body executed when the condition holds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub if_body: Block,
    /// Further conditions tried in order.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub else_if: Vec<ElseIf>,
    /// Body executed when no condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_body: Option<Block>,
}

impl IfBlock {
    /// Iterate over every branch body in source order.
    ///
    /// ```rust
    /// use earthgraph::ast::{ElseIf, IfBlock};
    /// let block = IfBlock {
    ///     else_if: vec![ElseIf::default()],
    ///     else_body: Some(Vec::new()),
    ///     ..IfBlock::default()
    /// };
    /// assert_eq!(block.branches().count(), 3);
    /// ```
    pub fn branches(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.if_body)
            .chain(self.else_if.iter().map(|branch| &branch.body))
            .chain(self.else_body.iter())
    }
}

/// An `ELSE IF` branch of an [`IfBlock`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElseIf {
    /// Condition tokens following `ELSE IF`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: Vec<String>,
    /// Body executed when this condition holds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Block,
}

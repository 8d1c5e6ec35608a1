//! Dependency extraction for individual Earthfile commands.
//!
//! Each instruction in the closed vocabulary either never references another
//! target or may do so through arguments prefixed with
//! [`REFERENCE_SIGIL`]. [`classify_and_extract`] applies that classification
//! and returns the referenced target names.
//!
//! ```rust
//! use earthgraph::extract::{Classification, classify_and_extract};
//!
//! let found = classify_and_extract("COPY", &["+deps/out", "./"]);
//! assert_eq!(found.target_names().collect::<Vec<_>>(), vec!["deps"]);
//! assert_eq!(classify_and_extract("RUN", &["+deps"]), Classification::NoDependency);
//! ```

use indexmap::IndexSet;

/// Marks an argument as a reference to another target.
pub const REFERENCE_SIGIL: char = '+';

/// Separates a target name from the artifact path inside it.
pub const PATH_SEPARATOR: char = '/';

/// Instructions whose arguments never reference other targets.
pub const NO_DEPENDENCY_COMMANDS: [&str; 8] = [
    "ARG",
    "ENTRYPOINT",
    "ENV",
    "FROM DOCKERFILE",
    "RUN",
    "SAVE ARTIFACT",
    "SAVE IMAGE",
    "WORKDIR",
];

/// Instructions that may build, copy from, or start from another target.
pub const DEPENDENCY_COMMANDS: [&str; 3] = ["BUILD", "COPY", "FROM"];

/// Behavioural class of a recognised instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// Arguments are never inspected.
    NoDependency,
    /// Every argument is scanned for target references.
    DependencyBearing,
}

/// Outcome of classifying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The command cannot introduce edges.
    NoDependency,
    /// Target names referenced by a dependency-bearing command. The set may
    /// be empty when no argument carries the sigil.
    Dependencies(IndexSet<String>),
    /// The command name is outside the known vocabulary.
    UnrecognizedCommand(String),
}

impl Classification {
    /// Iterate over the referenced target names.
    ///
    /// Yields nothing for [`Classification::NoDependency`] and
    /// [`Classification::UnrecognizedCommand`].
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        let names = match self {
            Self::Dependencies(names) => Some(names),
            Self::NoDependency | Self::UnrecognizedCommand(_) => None,
        };
        names.into_iter().flatten().map(String::as_str)
    }
}

/// Look up the class of an instruction name.
///
/// Returns `None` for names outside the vocabulary. Matching is exact and
/// case-sensitive.
#[must_use]
pub fn command_class(name: &str) -> Option<CommandClass> {
    match name {
        "ARG" | "ENTRYPOINT" | "ENV" | "FROM DOCKERFILE" | "RUN" | "SAVE ARTIFACT"
        | "SAVE IMAGE" | "WORKDIR" => Some(CommandClass::NoDependency),
        "BUILD" | "COPY" | "FROM" => Some(CommandClass::DependencyBearing),
        _ => None,
    }
}

/// Extract the target name referenced by a single argument.
///
/// The argument must start with [`REFERENCE_SIGIL`]; the remainder is cut at
/// the first [`PATH_SEPARATOR`].
///
/// ```rust
/// use earthgraph::extract::reference_target;
/// assert_eq!(reference_target("+foo/bar/baz"), Some("foo"));
/// assert_eq!(reference_target("foo"), None);
/// ```
#[must_use]
pub fn reference_target(arg: &str) -> Option<&str> {
    let reference = arg.strip_prefix(REFERENCE_SIGIL)?;
    reference.split(PATH_SEPARATOR).next()
}

/// Classify a command and collect the targets its arguments reference.
#[must_use]
pub fn classify_and_extract<S: AsRef<str>>(command_name: &str, arguments: &[S]) -> Classification {
    match command_class(command_name) {
        Some(CommandClass::NoDependency) => Classification::NoDependency,
        Some(CommandClass::DependencyBearing) => Classification::Dependencies(
            arguments
                .iter()
                .filter_map(|arg| reference_target(arg.as_ref()))
                .map(str::to_owned)
                .collect(),
        ),
        None => Classification::UnrecognizedCommand(command_name.to_owned()),
    }
}

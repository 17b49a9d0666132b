//! Construction-time validation of command trees.
//!
//! [`CommandTree`] checks each mutation as it happens and rejects the ones
//! that would break an invariant. [`validate_tree`] re-checks a finished tree
//! as a whole and reports every problem at once.
//!
//! # Examples
//!
//! ```
//! use argtree_core::*;
//!
//! let mut tree = CommandTree::new("app");
//! let root = tree.root();
//! tree.add_option(root, OptionDefinition::flag(Some("v"), Some("verbose"))).unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! // Same short name twice on one command
//! let err = tree
//!     .add_option(root, OptionDefinition::flag(Some("v"), Some("version")))
//!     .unwrap_err();
//! assert!(matches!(err, DefinitionError::AmbiguousOptionDefinition { .. }));
//! ```

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::{CommandId, CommandTree, OptionDefinition};

/// Why two option definitions cannot coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ambiguity {
    /// Two options on one command share a long or short name.
    DuplicateName,
    /// Clustering was explicitly requested while a multi-character short
    /// name is visible, so single-character scanning cannot tell them apart.
    MultiCharShortWithClustering,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "name is already declared on this command"),
            Self::MultiCharShortWithClustering => write!(
                f,
                "multi-character short name cannot be used with option clustering"
            ),
        }
    }
}

/// Errors raised while building or checking a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Option names collide, or the clustering configuration is ambiguous.
    #[error("ambiguous option definition '{option}' on '{command}': {reason}")]
    AmbiguousOptionDefinition {
        command: String,
        option: String,
        reason: Ambiguity,
    },
    /// An option has neither a long nor a short name.
    #[error("option on '{0}' must define a short or long name")]
    MissingOptionName(String),
    /// A name contains characters the tokenizer would split or misread.
    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: &'static str, name: String },
    /// Two sibling commands share a name or alias.
    #[error("duplicate command name '{name}' under '{parent}'")]
    DuplicateCommand { parent: String, name: String },
    /// Two arguments on one command share a name.
    #[error("duplicate argument '{name}' on '{command}'")]
    DuplicateArgument { command: String, name: String },
    /// An argument was declared after a multiple-value argument.
    #[error("argument '{name}' on '{command}' follows multiple-value argument '{multiple}'")]
    MultipleValueArgumentNotLast {
        command: String,
        name: String,
        multiple: String,
    },
    /// An option template could not be parsed.
    #[error("invalid option template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

/// Checks every command in the tree and returns all problems found.
///
/// # Examples
///
/// ```
/// use argtree_core::*;
///
/// let mut tree = CommandTree::new("app");
/// let serve = tree.add_command(tree.root(), "serve").unwrap();
/// tree.add_argument(serve, ArgumentDefinition::multiple("files")).unwrap();
/// assert!(validate_tree(&tree).is_empty());
/// ```
pub fn validate_tree(tree: &CommandTree) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    for id in tree.ids() {
        let node = tree.node(id);

        if let Err(e) = check_command_name(node.name()) {
            errors.push(e);
        }

        errors.extend(check_options(tree, id));
        errors.extend(check_arguments(tree, id));
        errors.extend(check_children(tree, id));

        if let Err(e) = check_clustering(tree, id) {
            errors.push(e);
        }
    }

    errors
}

pub(crate) fn check_command_name(name: &str) -> Result<(), DefinitionError> {
    let invalid = name.is_empty()
        || name.starts_with('-')
        || name.starts_with('@')
        || name.chars().any(char::is_whitespace);
    if invalid {
        return Err(DefinitionError::InvalidName {
            kind: "command",
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Checks one option's names in isolation.
pub(crate) fn check_option_names(
    command: &str,
    option: &OptionDefinition,
) -> Result<(), DefinitionError> {
    if option.long.is_none() && option.short.is_none() {
        return Err(DefinitionError::MissingOptionName(command.to_string()));
    }

    if let Some(long) = &option.long {
        if !is_valid_option_name(long) {
            return Err(DefinitionError::InvalidName {
                kind: "long option",
                name: long.clone(),
            });
        }
    }

    if let Some(short) = &option.short {
        // `-5` is read as a positional, so a digit-led short name is unreachable.
        let digit_led = short.chars().next().is_some_and(|c| c.is_ascii_digit());
        if !is_valid_option_name(short) || digit_led {
            return Err(DefinitionError::InvalidName {
                kind: "short option",
                name: short.clone(),
            });
        }
    }

    Ok(())
}

fn is_valid_option_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains(['=', ':'])
        && !name.chars().any(char::is_whitespace)
}

/// First option or sibling name collision at `id` under its effective
/// comparison mode.
pub(crate) fn check_name_collisions(
    tree: &CommandTree,
    id: CommandId,
) -> Result<(), DefinitionError> {
    match check_options(tree, id)
        .into_iter()
        .chain(check_children(tree, id))
        .next()
    {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn check_options(tree: &CommandTree, id: CommandId) -> Vec<DefinitionError> {
    let node = tree.node(id);
    let cmp = tree.effective_policy(id).name_comparison;
    let command = tree.display_path(id);
    let mut errors = Vec::new();
    let mut seen_long = HashSet::new();
    let mut seen_short = HashSet::new();

    for option in node.options() {
        if let Err(e) = check_option_names(&command, option) {
            errors.push(e);
            continue;
        }

        let duplicate_long = option
            .long
            .as_deref()
            .is_some_and(|l| !seen_long.insert(cmp.normalize(l).into_owned()));
        let duplicate_short = option
            .short
            .as_deref()
            .is_some_and(|s| !seen_short.insert(cmp.normalize(s).into_owned()));

        if duplicate_long || duplicate_short {
            errors.push(DefinitionError::AmbiguousOptionDefinition {
                command: command.clone(),
                option: option.display_name(),
                reason: Ambiguity::DuplicateName,
            });
        }
    }

    errors
}

fn check_arguments(tree: &CommandTree, id: CommandId) -> Vec<DefinitionError> {
    let node = tree.node(id);
    let command = tree.display_path(id);
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut multiple: Option<&str> = None;

    for arg in node.arguments() {
        if arg.name.trim().is_empty() {
            errors.push(DefinitionError::InvalidName {
                kind: "argument",
                name: arg.name.clone(),
            });
            continue;
        }
        if !seen.insert(arg.name.as_str()) {
            errors.push(DefinitionError::DuplicateArgument {
                command: command.clone(),
                name: arg.name.clone(),
            });
        }
        if let Some(previous) = multiple {
            errors.push(DefinitionError::MultipleValueArgumentNotLast {
                command: command.clone(),
                name: arg.name.clone(),
                multiple: previous.to_string(),
            });
        }
        if arg.multiple {
            multiple = Some(arg.name.as_str());
        }
    }

    errors
}

fn check_children(tree: &CommandTree, id: CommandId) -> Vec<DefinitionError> {
    let cmp = tree.effective_policy(id).name_comparison;
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for &child in tree.node(id).children() {
        for name in tree.node(child).names() {
            if !seen.insert(cmp.normalize(name).into_owned()) {
                errors.push(DefinitionError::DuplicateCommand {
                    parent: tree.display_path(id),
                    name: name.to_string(),
                });
            }
        }
    }

    errors
}

/// Rejects an explicit `cluster_options = true` on a command that can see a
/// multi-character short name.
pub(crate) fn check_clustering(tree: &CommandTree, id: CommandId) -> Result<(), DefinitionError> {
    if tree.node(id).policy().cluster_options != Some(true) {
        return Ok(());
    }

    match tree
        .visible_options(id)
        .into_iter()
        .find(|v| v.definition.has_multi_char_short())
    {
        Some(v) => Err(DefinitionError::AmbiguousOptionDefinition {
            command: tree.display_path(id),
            option: format!("-{}", v.definition.short.as_deref().unwrap_or_default()),
            reason: Ambiguity::MultiCharShortWithClustering,
        }),
        None => Ok(()),
    }
}

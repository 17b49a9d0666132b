//! Parse errors.
//!
//! Every structural failure aborts the parse and is returned as a
//! [`ParseError`] carrying the offending token or option and the command path
//! it was seen at. The only recoverable case, an unexpected argument under a
//! non-throwing policy, never reaches this type: it becomes remainder data.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationFailure;

/// What kind of token was not expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedKind {
    /// An option-looking token matching no visible option.
    Option,
    /// A positional token matching no subcommand and no free argument slot.
    Argument,
    /// `--` on a command that does not allow the argument separator.
    Separator,
}

impl fmt::Display for UnexpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option => write!(f, "option"),
            Self::Argument => write!(f, "command or argument"),
            Self::Separator => write!(f, "argument separator"),
        }
    }
}

/// Errors returned by [`Parser::parse`](crate::Parser::parse).
#[derive(Debug, Error)]
pub enum ParseError {
    /// A response file could not be read.
    #[error("cannot read response file '{}': {source}", path.display())]
    ResponseFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A value-taking option was the last token.
    #[error("missing value for option '{option}' on '{command}'")]
    MissingOptionValue { option: String, command: String },

    /// An unrecognized option, a surplus positional, or a disallowed `--`.
    #[error("unrecognized {kind} '{token}' for '{command}'")]
    UnexpectedArgument {
        token: String,
        command: String,
        kind: UnexpectedKind,
        suggestions: Vec<String>,
    },

    /// A value was attached to an option that takes none.
    #[error("option '{option}' on '{command}' does not take a value (got '{value}')")]
    UnexpectedOptionValue {
        option: String,
        value: String,
        command: String,
    },

    /// The first failing validator of the selected command.
    #[error("validation failed: {0}")]
    ValidationFailure(ValidationFailure),
}

impl ParseError {
    /// The offending token or option, when the error has one.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::MissingOptionValue { option, .. } | Self::UnexpectedOptionValue { option, .. } => {
                Some(option)
            }
            Self::UnexpectedArgument { token, .. } => Some(token),
            Self::ResponseFile { .. } | Self::ValidationFailure(_) => None,
        }
    }

    /// Supplementary guidance built from suggestions, if there are any.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_parser::{ParseError, UnexpectedKind};
    ///
    /// let err = ParseError::UnexpectedArgument {
    ///     token: "pshu".into(),
    ///     command: "git".into(),
    ///     kind: UnexpectedKind::Argument,
    ///     suggestions: vec!["push".into()],
    /// };
    /// assert_eq!(err.hint().unwrap(), "Did you mean this?\n    push");
    /// ```
    pub fn hint(&self) -> Option<String> {
        let Self::UnexpectedArgument { suggestions, .. } = self else {
            return None;
        };
        match suggestions.as_slice() {
            [] => None,
            [only] => Some(format!("Did you mean this?\n    {only}")),
            many => {
                let mut out = String::from("Did you mean one of these?");
                for s in many {
                    out.push_str("\n    ");
                    out.push_str(s);
                }
                Some(out)
            }
        }
    }
}

//! Post-parse validation.
//!
//! Validators run after a structurally successful parse, against the
//! selected command only. The first failure wins and the remaining
//! validators of that command are skipped.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::result::ParseResult;

/// A failed validation, optionally naming the option or argument at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one validator, or of a whole validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationResult {
    #[default]
    Success,
    Failure(ValidationFailure),
}

impl ValidationResult {
    /// Builds a failure attributed to `member`.
    pub fn failure(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(ValidationFailure {
            member: Some(member.into()),
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure_ref(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Success => None,
            Self::Failure(f) => Some(f),
        }
    }
}

/// A check run against a finished parse.
///
/// Any `Fn(&ParseResult) -> ValidationResult` closure is a validator.
/// Validators are shared by concurrent parses and must be `Send + Sync`.
pub trait Validator: Send + Sync {
    fn validate(&self, result: &ParseResult<'_>) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&ParseResult<'_>) -> ValidationResult + Send + Sync,
{
    fn validate(&self, result: &ParseResult<'_>) -> ValidationResult {
        self(result)
    }
}

/// What a built-in validator checks: an option or an argument, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An option, named as `--long`, `-s` or bare.
    Option(String),
    /// A positional argument of the selected command or one of its ancestors.
    Argument(String),
}

impl Target {
    fn name(&self) -> &str {
        match self {
            Self::Option(n) | Self::Argument(n) => n,
        }
    }

    fn values<'r>(&self, result: &'r ParseResult<'_>) -> &'r [String] {
        match self {
            Self::Option(n) => result.option_values(n),
            Self::Argument(n) => result.argument_values(n),
        }
    }

    fn is_bound(&self, result: &ParseResult<'_>) -> bool {
        match self {
            Self::Option(n) => result.is_present(n),
            Self::Argument(n) => !result.argument_values(n).is_empty(),
        }
    }
}

/// Fails unless the target was given.
#[derive(Debug, Clone)]
pub struct Required {
    target: Target,
}

impl Required {
    pub fn option(name: &str) -> Self {
        Self {
            target: Target::Option(name.to_string()),
        }
    }

    pub fn argument(name: &str) -> Self {
        Self {
            target: Target::Argument(name.to_string()),
        }
    }
}

impl Validator for Required {
    fn validate(&self, result: &ParseResult<'_>) -> ValidationResult {
        if self.target.is_bound(result) {
            return ValidationResult::Success;
        }
        let message = match &self.target {
            Target::Option(n) => format!("The option '{n}' is required."),
            Target::Argument(n) => format!("The argument '{n}' is required."),
        };
        ValidationResult::failure(self.target.name(), message)
    }
}

/// Fails if any bound value of the target is not in the allowed set.
///
/// # Examples
///
/// ```
/// use argtree_core::{CommandTree, OptionArity, OptionDefinition};
/// use argtree_parser::{AllowedValues, Parser, ValidationResult};
///
/// let mut tree = CommandTree::new("app");
/// let root = tree.root();
/// tree.add_option(root, OptionDefinition::valued(None, Some("color"), OptionArity::Single))
///     .unwrap();
///
/// let mut parser = Parser::new(tree);
/// parser.add_validator(
///     root,
///     AllowedValues::option("--color", ["always", "never"]).ignore_case(),
/// );
///
/// assert!(parser.parse(["--color", "NEVER"]).unwrap().validation().is_success());
/// assert!(!parser.parse(["--color", "blue"]).unwrap().validation().is_success());
/// ```
#[derive(Debug, Clone)]
pub struct AllowedValues {
    target: Target,
    allowed: Vec<String>,
    ignore_case: bool,
}

impl AllowedValues {
    pub fn option<I, S>(name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Target::Option(name.to_string()), allowed)
    }

    pub fn argument<I, S>(name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Target::Argument(name.to_string()), allowed)
    }

    fn new<I, S>(target: Target, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            allowed: allowed.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    /// Compares values case-insensitively.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn permits(&self, value: &str) -> bool {
        self.allowed.iter().any(|a| {
            if self.ignore_case {
                a.to_lowercase() == value.to_lowercase()
            } else {
                a == value
            }
        })
    }
}

impl Validator for AllowedValues {
    fn validate(&self, result: &ParseResult<'_>) -> ValidationResult {
        match self.target.values(result).iter().find(|v| !self.permits(v)) {
            None => ValidationResult::Success,
            Some(bad) => ValidationResult::failure(
                self.target.name(),
                format!(
                    "Invalid value '{bad}' for '{}'. Allowed values are: {}",
                    self.target.name(),
                    self.allowed.join(", ")
                ),
            ),
        }
    }
}

/// Fails if an option was given more than once.
#[derive(Debug, Clone)]
pub struct SingleValue {
    option: String,
}

impl SingleValue {
    pub fn option(name: &str) -> Self {
        Self {
            option: name.to_string(),
        }
    }
}

impl Validator for SingleValue {
    fn validate(&self, result: &ParseResult<'_>) -> ValidationResult {
        if result.occurrences(&self.option) <= 1 {
            return ValidationResult::Success;
        }
        ValidationResult::failure(
            self.option.as_str(),
            format!("The option '{}' may only be given once.", self.option),
        )
    }
}

/// Runs `validators` in order and returns the first failure.
pub(crate) fn run_validators(
    validators: &[Box<dyn Validator>],
    result: &ParseResult<'_>,
) -> ValidationResult {
    for (index, validator) in validators.iter().enumerate() {
        let outcome = validator.validate(result);
        if let ValidationResult::Failure(failure) = &outcome {
            debug!(
                validator = index,
                member = failure.member.as_deref().unwrap_or(""),
                "Validation failed, skipping remaining validators"
            );
            return outcome;
        }
    }
    ValidationResult::Success
}

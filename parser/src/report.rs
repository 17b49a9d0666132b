//! Serializable summary of a parse.

use serde::{Deserialize, Serialize};

use crate::result::{InformationRequest, ParseResult};
use crate::validation::{ValidationFailure, ValidationResult};

/// Values bound to one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionReport {
    /// Path of the command that declares the option.
    pub command: String,
    /// The option as typed, `--long` when it has a long name.
    pub name: String,
    pub occurrences: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Values bound to one positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentReport {
    pub command: String,
    pub name: String,
    pub values: Vec<String>,
}

/// A flattened, owned view of a [`ParseResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Names from the root down to the selected command.
    pub command_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remainder: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_failure: Option<ReportedFailure>,
}

/// A validation failure as stored in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message: String,
}

impl From<&ValidationFailure> for ReportedFailure {
    fn from(failure: &ValidationFailure) -> Self {
        Self {
            member: failure.member.clone(),
            message: failure.message.clone(),
        }
    }
}

impl ParseReport {
    pub(crate) fn from_result(result: &ParseResult<'_>) -> Self {
        let tree = result.tree();
        let options = result
            .bound_options()
            .map(|(id, binding)| OptionReport {
                command: tree.display_path(id.command),
                name: tree.option(id).display_name(),
                occurrences: binding.occurrences,
                values: binding.values.clone(),
            })
            .collect();
        let arguments = result
            .bound_arguments()
            .map(|(id, values)| ArgumentReport {
                command: tree.display_path(id.command),
                name: tree.argument(id).name.clone(),
                values: values.to_vec(),
            })
            .collect();
        let information = result.information().map(|request| match request {
            InformationRequest::Help => "help".to_string(),
            InformationRequest::Version => "version".to_string(),
        });
        let validation_failure = match result.validation() {
            ValidationResult::Success => None,
            ValidationResult::Failure(f) => Some(ReportedFailure::from(f)),
        };

        Self {
            command_path: result.command_path().into_iter().map(String::from).collect(),
            options,
            arguments,
            remainder: result.remainder().to_vec(),
            information,
            validation_failure,
        }
    }

    /// Returns `true` unless a validator failed.
    pub fn is_valid(&self) -> bool {
        self.validation_failure.is_none()
    }
}

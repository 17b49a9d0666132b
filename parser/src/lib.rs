//! Hierarchical command-line parsing over an `argtree-core` command tree.
//!
//! A [`Parser`] walks a token sequence down a [`CommandTree`]: positional
//! tokens select subcommands or fill positional arguments, option tokens are
//! matched against the options visible at the current command (its own plus
//! the inherited ones of its ancestors), and the policy of the current
//! command decides how clustering, response files, `--` and unexpected
//! tokens are handled.
//!
//! # Main entry points
//!
//! - [`Parser::parse`] — structural parse plus validation; a validation
//!   failure is recorded in the [`ParseResult`].
//! - [`Parser::parse_and_validate`] — same, but a validation failure is an
//!   error.
//! - [`expand_response_files`] — response-file expansion on its own.
//!
//! # Example
//!
//! ```
//! use argtree_core::{CommandPolicy, CommandTree, OptionArity, OptionDefinition};
//! use argtree_parser::{ParseError, Parser};
//!
//! let mut tree = CommandTree::new("app");
//! let root = tree.root();
//! let serve = tree.add_command(root, "serve").unwrap();
//! let start = tree.add_command(serve, "start").unwrap();
//! tree.add_option(start, OptionDefinition::valued(None, Some("port"), OptionArity::Single))
//!     .unwrap();
//! let known = tree.add_command(root, "known").unwrap();
//! tree.set_policy(known, CommandPolicy::default().with_throw_on_unexpected_argument(false))
//!     .unwrap();
//!
//! let parser = Parser::new(tree);
//!
//! let result = parser.parse(["serve", "start", "--port", "8080"]).unwrap();
//! assert_eq!(result.command_path(), ["app", "serve", "start"]);
//! assert_eq!(result.option_value("--port"), Some("8080"));
//!
//! let result = parser.parse(["known", "--unknown-flag", "x"]).unwrap();
//! assert_eq!(result.remainder(), ["--unknown-flag", "x"]);
//!
//! let err = parser.parse(["serve", "--unknown-flag"]).unwrap_err();
//! assert!(matches!(err, ParseError::UnexpectedArgument { .. }));
//! ```
//!
//! [`CommandTree`]: argtree_core::CommandTree

mod binding;
mod error;
mod matcher;
pub mod output;
mod parser;
mod report;
mod resolver;
mod response_file;
mod result;
mod suggest;
mod token;
mod validation;
mod value;

pub use binding::OptionBinding;
pub use error::{ParseError, UnexpectedKind};
pub use parser::Parser;
pub use report::{ArgumentReport, OptionReport, ParseReport, ReportedFailure};
pub use response_file::{
    expand_response_files, read_response_file, response_file_path, split_response_text,
};
pub use result::{InformationRequest, ParseResult};
pub use suggest::suggest;
pub use validation::{
    AllowedValues, Required, SingleValue, Target, ValidationFailure, ValidationResult, Validator,
};
pub use value::{ConversionError, FromArgValue};

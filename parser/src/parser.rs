//! The parser front end: a command tree plus its validators.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use argtree_core::{CommandDefinition, CommandId, CommandTree, DefinitionError};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::resolver;
use crate::response_file::TokenStream;
use crate::result::ParseResult;
use crate::validation::{
    AllowedValues, Required, SingleValue, ValidationResult, Validator, run_validators,
};

/// Parses token sequences against a fixed command tree.
///
/// The tree is never modified by parsing, so one `Parser` can serve any
/// number of parses, concurrently if it is shared between threads.
///
/// # Examples
///
/// ```
/// use argtree_core::{ArgumentDefinition, CommandTree, OptionDefinition};
/// use argtree_parser::Parser;
///
/// let mut tree = CommandTree::new("app");
/// let root = tree.root();
/// tree.add_option(root, OptionDefinition::from_template("-v|--verbose").unwrap().inherited())
///     .unwrap();
/// let serve = tree.add_command(root, "serve").unwrap();
/// tree.add_option(serve, OptionDefinition::from_template("-p|--port <PORT>").unwrap())
///     .unwrap();
/// tree.add_argument(serve, ArgumentDefinition::new("name")).unwrap();
///
/// let parser = Parser::new(tree);
/// let result = parser.parse(["serve", "-vp", "8080", "web"]).unwrap();
/// assert_eq!(result.command_path(), ["app", "serve"]);
/// assert!(result.is_present("--verbose"));
/// assert_eq!(result.option_value("--port"), Some("8080"));
/// assert_eq!(result.argument_value("name"), Some("web"));
/// ```
pub struct Parser {
    tree: CommandTree,
    validators: HashMap<CommandId, Vec<Box<dyn Validator>>>,
    working_directory: PathBuf,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<CommandId, usize> = self
            .validators
            .iter()
            .map(|(id, v)| (*id, v.len()))
            .collect();
        f.debug_struct("Parser")
            .field("tree", &self.tree)
            .field("validators", &counts)
            .field("working_directory", &self.working_directory)
            .finish()
    }
}

impl Parser {
    /// Creates a parser resolving response files against the process's
    /// current directory.
    pub fn new(tree: CommandTree) -> Self {
        let working_directory = std::env::current_dir().unwrap_or_else(|e| {
            warn!(error = %e, "Cannot read current directory, using '.'");
            PathBuf::from(".")
        });
        Self {
            tree,
            validators: HashMap::new(),
            working_directory,
        }
    }

    /// Builds the tree described by `definition` and registers the
    /// validators its `required`, `allowed_values` and `single` hints ask
    /// for. Hints on an inherited option apply to every command below it.
    pub fn from_definition(definition: &CommandDefinition) -> Result<Self, DefinitionError> {
        let tree = CommandTree::from_definition(definition)?;
        let mut parser = Self::new(tree);
        let root = parser.tree.root();
        parser.register_hints(root, definition)?;
        Ok(parser)
    }

    /// Resolves relative response-file paths against `dir`.
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Registers a validator for `command`. Validators of a command run in
    /// registration order when that command is the one selected.
    pub fn add_validator<V>(&mut self, command: CommandId, validator: V) -> &mut Self
    where
        V: Validator + 'static,
    {
        self.validators
            .entry(command)
            .or_default()
            .push(Box::new(validator));
        self
    }

    /// Registers a closure validator for `command`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{CommandTree, OptionDefinition};
    /// use argtree_parser::{Parser, ValidationResult};
    ///
    /// let mut tree = CommandTree::new("app");
    /// let root = tree.root();
    /// tree.add_option(root, OptionDefinition::from_template("-a").unwrap()).unwrap();
    /// tree.add_option(root, OptionDefinition::from_template("-b").unwrap()).unwrap();
    ///
    /// let mut parser = Parser::new(tree);
    /// parser.add_validator_fn(root, |result| {
    ///     if result.is_present("-a") && result.is_present("-b") {
    ///         ValidationResult::failure("-b", "-a and -b are mutually exclusive")
    ///     } else {
    ///         ValidationResult::Success
    ///     }
    /// });
    ///
    /// assert!(parser.parse(["-a"]).unwrap().validation().is_success());
    /// assert!(parser.parse_and_validate(["-ab"]).is_err());
    /// ```
    pub fn add_validator_fn<F>(&mut self, command: CommandId, validator: F) -> &mut Self
    where
        F: Fn(&ParseResult<'_>) -> ValidationResult + Send + Sync + 'static,
    {
        self.add_validator(command, validator)
    }

    pub fn validators(&self, command: CommandId) -> &[Box<dyn Validator>] {
        self.validators
            .get(&command)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parses `args` (without the program name).
    ///
    /// Structural problems fail with a [`ParseError`]. Validation failures
    /// do not: they are recorded in [`ParseResult::validation`]. Validation
    /// is skipped when a help or version option was matched.
    pub fn parse<I, S>(&self, args: I) -> Result<ParseResult<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resolution = resolver::resolve(
            &self.tree,
            TokenStream::new(args),
            &self.working_directory,
        )?;

        let mut result = ParseResult {
            tree: &self.tree,
            chain: resolution.chain,
            remainder: resolution.remainder,
            bindings: resolution.bindings,
            information: resolution.information,
            validation: ValidationResult::Success,
        };
        if result.information.is_none() {
            result.validation = run_validators(self.validators(result.command()), &result);
        }

        debug!(
            command = %self.tree.display_path(result.command()),
            remainder = result.remainder.len(),
            valid = result.validation.is_success(),
            "Parse finished"
        );
        Ok(result)
    }

    /// Like [`parse`](Self::parse), but a validation failure is returned as
    /// [`ParseError::ValidationFailure`].
    pub fn parse_and_validate<I, S>(&self, args: I) -> Result<ParseResult<'_>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self.parse(args)?;
        if let ValidationResult::Failure(failure) = result.validation() {
            return Err(ParseError::ValidationFailure(failure.clone()));
        }
        Ok(result)
    }

    fn register_hints(
        &mut self,
        id: CommandId,
        definition: &CommandDefinition,
    ) -> Result<(), DefinitionError> {
        for spec in &definition.options {
            let option = spec.to_definition()?;
            let name = option.display_name();
            let declared = self.tree.find_option(id, &name).map(|v| v.id);
            let mut targets = vec![id];
            if option.inherited {
                // Skip commands where a local option shadows this one.
                targets.extend(
                    self.tree
                        .descendants(id)
                        .into_iter()
                        .filter(|&c| self.tree.find_option(c, &name).map(|v| v.id) == declared),
                );
            }
            for target in targets {
                if spec.required {
                    self.add_validator(target, Required::option(&name));
                }
                if !spec.allowed_values.is_empty() {
                    let mut allowed = AllowedValues::option(&name, spec.allowed_values.clone());
                    if spec.ignore_case {
                        allowed = allowed.ignore_case();
                    }
                    self.add_validator(target, allowed);
                }
                if spec.single {
                    self.add_validator(target, SingleValue::option(&name));
                }
            }
        }

        for spec in &definition.arguments {
            if spec.required {
                self.add_validator(id, Required::argument(&spec.name));
            }
            if !spec.allowed_values.is_empty() {
                let mut allowed = AllowedValues::argument(&spec.name, spec.allowed_values.clone());
                if spec.ignore_case {
                    allowed = allowed.ignore_case();
                }
                self.add_validator(id, allowed);
            }
        }

        // Children were created in document order.
        let children = self.tree.node(id).children().to_vec();
        for (child, child_definition) in children.into_iter().zip(&definition.commands) {
            self.register_hints(child, child_definition)?;
        }
        Ok(())
    }
}

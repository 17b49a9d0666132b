//! The outcome of a successful parse.

use argtree_core::{ArgumentId, CommandId, CommandTree, OptionId};

use crate::binding::{Bindings, OptionBinding};
use crate::report::ParseReport;
use crate::validation::ValidationResult;
use crate::value::{ConversionError, FromArgValue, convert};

/// An information request made by a help or version option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationRequest {
    Help,
    Version,
}

/// Selected command, bound values and leftovers of one parse.
///
/// The result borrows the parser's tree; lookups by name go through the
/// options visible at the selected command, then through the options the
/// commands above it declared for themselves.
#[derive(Debug)]
pub struct ParseResult<'t> {
    pub(crate) tree: &'t CommandTree,
    pub(crate) chain: Vec<CommandId>,
    pub(crate) remainder: Vec<String>,
    pub(crate) bindings: Bindings,
    pub(crate) information: Option<InformationRequest>,
    pub(crate) validation: ValidationResult,
}

impl<'t> ParseResult<'t> {
    pub fn tree(&self) -> &'t CommandTree {
        self.tree
    }

    /// The deepest command reached.
    pub fn command(&self) -> CommandId {
        self.chain.last().copied().unwrap_or_else(|| self.tree.root())
    }

    /// Commands from the root down to the selected one.
    pub fn chain(&self) -> &[CommandId] {
        &self.chain
    }

    /// Names from the root down to the selected command.
    pub fn command_path(&self) -> Vec<&'t str> {
        self.tree.path(self.command())
    }

    /// Tokens left unconsumed, in order: everything after an allowed `--`,
    /// after a help or version option, or from the first unexpected token
    /// on under a non-throwing policy.
    pub fn remainder(&self) -> &[String] {
        &self.remainder
    }

    pub fn information(&self) -> Option<InformationRequest> {
        self.information
    }

    /// Outcome of the selected command's validators. Always `Success` when
    /// validation was skipped because of an information request.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Resolves an option name (`--long`, `-s` or bare) to its id.
    ///
    /// Options visible at the selected command win, so a local option that
    /// shadows an inherited one resolves to the local id even when only the
    /// inherited one was matched before descent. The value accessors
    /// ([`is_present`](Self::is_present), [`option_values`](Self::option_values)
    /// and friends) fall back to such a shadowed binding.
    pub fn find_option(&self, name: &str) -> Option<OptionId> {
        let command = self.command();
        if let Some(visible) = self.tree.find_option(command, name) {
            return Some(visible.id);
        }
        // Options matched before descending into a subcommand.
        self.ancestors_in_chain().find_map(|id| self.own_option(id, name))
    }

    fn own_option(&self, command: CommandId, name: &str) -> Option<OptionId> {
        let cmp = self.tree.effective_policy(command).name_comparison;
        self.tree
            .node(command)
            .options()
            .iter()
            .position(|o| o.matches_name(name, cmp))
            .map(|index| OptionId { command, index })
    }

    /// The chain above the selected command, nearest first.
    fn ancestors_in_chain(&self) -> impl Iterator<Item = CommandId> + '_ {
        self.chain.iter().rev().skip(1).copied()
    }

    /// Resolves an argument name, searching the selected command first.
    pub fn find_argument(&self, name: &str) -> Option<ArgumentId> {
        self.chain
            .iter()
            .rev()
            .find_map(|&id| self.tree.find_argument(id, name))
    }

    pub fn option_binding(&self, id: OptionId) -> Option<&OptionBinding> {
        self.bindings.option(id)
    }

    /// Every bound option, ordered by id.
    pub fn bound_options(&self) -> impl Iterator<Item = (OptionId, &OptionBinding)> {
        self.bindings.options()
    }

    /// Every bound argument, ordered by id.
    pub fn bound_arguments(&self) -> impl Iterator<Item = (ArgumentId, &[String])> {
        self.bindings.arguments()
    }

    fn binding(&self, name: &str) -> Option<&OptionBinding> {
        self.find_option(name)
            .and_then(|id| self.bindings.option(id))
            .or_else(|| {
                self.ancestors_in_chain()
                    .filter_map(|id| self.own_option(id, name))
                    .find_map(|id| self.bindings.option(id))
            })
    }

    /// Returns `true` if the option was matched at least once.
    pub fn is_present(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.binding(name).map_or(0, |b| b.occurrences)
    }

    /// All values bound to an option, in command-line order.
    pub fn option_values(&self, name: &str) -> &[String] {
        self.binding(name)
            .map(|b| b.values.as_slice())
            .unwrap_or_default()
    }

    /// The first value bound to an option.
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.option_values(name).first().map(String::as_str)
    }

    /// The first value of an option, converted.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{CommandTree, OptionDefinition};
    /// use argtree_parser::Parser;
    ///
    /// let mut tree = CommandTree::new("app");
    /// let root = tree.root();
    /// tree.add_option(root, OptionDefinition::from_template("-p|--port <PORT>").unwrap())
    ///     .unwrap();
    /// let parser = Parser::new(tree);
    ///
    /// let result = parser.parse(["-p", "8080"]).unwrap();
    /// assert_eq!(result.value_of::<u16>("--port").unwrap(), Some(8080));
    ///
    /// let result = parser.parse(["-p", "http"]).unwrap();
    /// assert!(result.value_of::<u16>("--port").is_err());
    /// ```
    pub fn value_of<T: FromArgValue>(&self, name: &str) -> Result<Option<T>, ConversionError> {
        self.option_value(name)
            .map(|raw| convert(name, raw))
            .transpose()
    }

    /// Every value of an option, converted.
    pub fn values_of<T: FromArgValue>(&self, name: &str) -> Result<Vec<T>, ConversionError> {
        self.option_values(name)
            .iter()
            .map(|raw| convert(name, raw))
            .collect()
    }

    /// Values bound to an argument; one element unless it is multiple.
    pub fn argument_values(&self, name: &str) -> &[String] {
        self.find_argument(name)
            .and_then(|id| self.bindings.argument(id))
            .unwrap_or(&[])
    }

    pub fn argument_value(&self, name: &str) -> Option<&str> {
        self.argument_values(name).first().map(String::as_str)
    }

    pub fn argument_value_of<T: FromArgValue>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ConversionError> {
        self.argument_value(name)
            .map(|raw| convert(name, raw))
            .transpose()
    }

    pub fn argument_values_of<T: FromArgValue>(
        &self,
        name: &str,
    ) -> Result<Vec<T>, ConversionError> {
        self.argument_values(name)
            .iter()
            .map(|raw| convert(name, raw))
            .collect()
    }

    /// A serializable summary of this result.
    pub fn report(&self) -> ParseReport {
        ParseReport::from_result(self)
    }
}

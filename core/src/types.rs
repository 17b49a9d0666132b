//! Option, argument and policy definitions.
//!
//! These types are purely declarative. Parsing never writes into them; bound
//! values live in the parser's binding snapshot, so a definition can be shared
//! by any number of concurrent parses.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How many values an option accepts per occurrence.
///
/// # Examples
///
/// ```
/// use argtree_core::OptionArity;
///
/// assert!(!OptionArity::NoValue.takes_value());
/// assert!(OptionArity::OptionalSingle.takes_value());
/// assert!(!OptionArity::OptionalSingle.requires_value());
/// assert!(OptionArity::Multiple.requires_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptionArity {
    /// A switch; never receives a value.
    #[default]
    NoValue,
    /// One value per occurrence (`--port 80`).
    Single,
    /// One value per occurrence, repeatable by intent (`-I a -I b`).
    Multiple,
    /// A value only when given inline (`--color` or `--color=always`).
    OptionalSingle,
}

impl OptionArity {
    /// Returns `true` if the option can carry a value at all.
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::NoValue)
    }

    /// Returns `true` if a missing value is an error.
    pub fn requires_value(self) -> bool {
        matches!(self, Self::Single | Self::Multiple)
    }
}

/// Special meaning the engine attaches to an option.
///
/// Matching a `Help` or `Version` option stops the parse and records an
/// information request instead of running validators. Rendering the help or
/// version text is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptionRole {
    /// An ordinary option.
    #[default]
    Regular,
    /// Requests help output.
    Help,
    /// Requests version output.
    Version,
}

/// How command and option names are compared.
///
/// # Examples
///
/// ```
/// use argtree_core::NameComparison;
///
/// assert!(!NameComparison::Ordinal.matches("Serve", "serve"));
/// assert!(NameComparison::IgnoreCase.matches("Serve", "serve"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NameComparison {
    /// Exact, case-sensitive comparison.
    #[default]
    Ordinal,
    /// Case-insensitive comparison (Unicode lowercase folding).
    IgnoreCase,
}

impl NameComparison {
    /// Returns `true` if `a` and `b` name the same thing under this mode.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::Ordinal => a == b,
            Self::IgnoreCase => a == b || a.to_lowercase() == b.to_lowercase(),
        }
    }

    /// Returns the form of `name` used as a key for collision checks.
    pub fn normalize<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self {
            Self::Ordinal => Cow::Borrowed(name),
            Self::IgnoreCase => Cow::Owned(name.to_lowercase()),
        }
    }
}

/// Whether `@file` tokens are expanded, and how the file is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFileHandling {
    /// `@file` tokens are ordinary tokens.
    #[default]
    Disabled,
    /// Tokens are whitespace separated; double-quoted spans stay together.
    SpaceSeparated,
    /// Every non-empty line is one token.
    LineSeparated,
}

impl ResponseFileHandling {
    /// Returns `true` unless expansion is disabled.
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Definition of a named option.
///
/// Names are stored without their leading dashes: the option `-p|--port`
/// has `short = Some("p")` and `long = Some("port")`. Short names are
/// normally one character; longer short names are accepted but switch
/// clustering off for every command that can see them.
///
/// # Examples
///
/// ```
/// use argtree_core::{OptionArity, OptionDefinition};
///
/// let verbose = OptionDefinition::flag(Some("v"), Some("verbose"))
///     .with_description("Enable verbose output")
///     .inherited();
/// assert_eq!(verbose.canonical_name(), "verbose");
/// assert_eq!(verbose.display_name(), "--verbose");
/// assert!(verbose.inherited);
///
/// let port = OptionDefinition::valued(Some("p"), Some("port"), OptionArity::Single)
///     .with_value_name("PORT");
/// assert!(port.arity.requires_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    /// Long form without the leading `--`.
    pub long: Option<String>,
    /// Short form without the leading `-`.
    pub short: Option<String>,
    /// Symbol shown for the value in help output (e.g. `PORT`).
    pub value_name: Option<String>,
    /// Description for help output.
    pub description: Option<String>,
    /// Value arity.
    pub arity: OptionArity,
    /// Visible to every descendant command when `true`.
    pub inherited: bool,
    /// Special handling, if any.
    pub role: OptionRole,
}

impl OptionDefinition {
    /// Creates an option that takes no value.
    pub fn flag(short: Option<&str>, long: Option<&str>) -> Self {
        Self::valued(short, long, OptionArity::NoValue)
    }

    /// Creates an option with the given arity.
    pub fn valued(short: Option<&str>, long: Option<&str>, arity: OptionArity) -> Self {
        Self {
            long: long.map(String::from),
            short: short.map(String::from),
            value_name: None,
            description: None,
            arity,
            inherited: false,
            role: OptionRole::Regular,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the value symbol used in help output.
    pub fn with_value_name(mut self, name: &str) -> Self {
        self.value_name = Some(name.to_string());
        self
    }

    /// Overrides the arity.
    pub fn with_arity(mut self, arity: OptionArity) -> Self {
        self.arity = arity;
        self
    }

    /// Sets the option role.
    pub fn with_role(mut self, role: OptionRole) -> Self {
        self.role = role;
        self
    }

    /// Makes the option visible to all descendant commands.
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Returns the long name if present, otherwise the short name.
    pub fn canonical_name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or("unknown")
    }

    /// Returns the name as typed on a command line (`--long` or `-s`).
    pub fn display_name(&self) -> String {
        match (&self.long, &self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => "unknown".to_string(),
        }
    }

    /// Checks the long name against `name` (without dashes).
    pub fn matches_long(&self, name: &str, cmp: NameComparison) -> bool {
        self.long.as_deref().is_some_and(|l| cmp.matches(l, name))
    }

    /// Checks the short name against `name` (without the dash).
    pub fn matches_short(&self, name: &str, cmp: NameComparison) -> bool {
        self.short.as_deref().is_some_and(|s| cmp.matches(s, name))
    }

    /// Checks `name` in any of the forms `--long`, `-s`, `long` or `s`.
    pub fn matches_name(&self, name: &str, cmp: NameComparison) -> bool {
        if let Some(long) = name.strip_prefix("--") {
            self.matches_long(long, cmp)
        } else if let Some(short) = name.strip_prefix('-') {
            self.matches_short(short, cmp)
        } else {
            self.matches_long(name, cmp) || self.matches_short(name, cmp)
        }
    }

    /// Returns `true` if the two options share a long or a short name.
    pub fn collides_with(&self, other: &OptionDefinition, cmp: NameComparison) -> bool {
        other.long.as_deref().is_some_and(|l| self.matches_long(l, cmp))
            || other.short.as_deref().is_some_and(|s| self.matches_short(s, cmp))
    }

    /// Returns `true` if the short name is longer than one character.
    pub fn has_multi_char_short(&self) -> bool {
        self.short.as_deref().is_some_and(|s| s.chars().count() > 1)
    }
}

/// Definition of a positional argument.
///
/// # Examples
///
/// ```
/// use argtree_core::ArgumentDefinition;
///
/// let name = ArgumentDefinition::new("name");
/// assert!(!name.multiple);
///
/// let tags = ArgumentDefinition::multiple("tags").with_description("Extra tags");
/// assert!(tags.multiple);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    /// Name used for lookups and help output.
    pub name: String,
    /// Description for help output.
    pub description: Option<String>,
    /// Absorbs every remaining positional token when `true`.
    pub multiple: bool,
}

impl ArgumentDefinition {
    /// Creates a single-value argument.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            multiple: false,
        }
    }

    /// Creates an argument that accepts any number of values.
    pub fn multiple(name: &str) -> Self {
        Self {
            multiple: true,
            ..Self::new(name)
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }
}

/// Parsing policy as declared on one command.
///
/// Every field is optional. An unset field is taken from the nearest ancestor
/// that sets it, and from the tree defaults when no ancestor does (see
/// [`CommandTree::effective_policy`](crate::CommandTree::effective_policy)).
///
/// # Examples
///
/// ```
/// use argtree_core::{CommandPolicy, NameComparison};
///
/// let policy = CommandPolicy::default()
///     .with_throw_on_unexpected_argument(false)
///     .with_name_comparison(NameComparison::IgnoreCase);
/// assert_eq!(policy.throw_on_unexpected_argument, Some(false));
/// assert_eq!(policy.allow_argument_separator, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_on_unexpected_argument: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_file_handling: Option<ResponseFileHandling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_argument_separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_comparison: Option<NameComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_options: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_suggestions: Option<bool>,
}

impl CommandPolicy {
    pub fn with_throw_on_unexpected_argument(mut self, value: bool) -> Self {
        self.throw_on_unexpected_argument = Some(value);
        self
    }

    pub fn with_response_file_handling(mut self, value: ResponseFileHandling) -> Self {
        self.response_file_handling = Some(value);
        self
    }

    pub fn with_allow_argument_separator(mut self, value: bool) -> Self {
        self.allow_argument_separator = Some(value);
        self
    }

    pub fn with_name_comparison(mut self, value: NameComparison) -> Self {
        self.name_comparison = Some(value);
        self
    }

    pub fn with_cluster_options(mut self, value: bool) -> Self {
        self.cluster_options = Some(value);
        self
    }

    pub fn with_make_suggestions(mut self, value: bool) -> Self {
        self.make_suggestions = Some(value);
        self
    }

    /// Fills every unset field from `parent`.
    pub(crate) fn or(self, parent: CommandPolicy) -> CommandPolicy {
        CommandPolicy {
            throw_on_unexpected_argument: self
                .throw_on_unexpected_argument
                .or(parent.throw_on_unexpected_argument),
            response_file_handling: self
                .response_file_handling
                .or(parent.response_file_handling),
            allow_argument_separator: self
                .allow_argument_separator
                .or(parent.allow_argument_separator),
            name_comparison: self.name_comparison.or(parent.name_comparison),
            cluster_options: self.cluster_options.or(parent.cluster_options),
            make_suggestions: self.make_suggestions.or(parent.make_suggestions),
        }
    }
}

/// Fully resolved policy for one command.
///
/// The [`Default`] value is the root default used when neither a command nor
/// any of its ancestors sets a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePolicy {
    pub throw_on_unexpected_argument: bool,
    pub response_file_handling: ResponseFileHandling,
    pub allow_argument_separator: bool,
    pub name_comparison: NameComparison,
    pub cluster_options: bool,
    pub make_suggestions: bool,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            throw_on_unexpected_argument: true,
            response_file_handling: ResponseFileHandling::Disabled,
            allow_argument_separator: false,
            name_comparison: NameComparison::Ordinal,
            cluster_options: true,
            make_suggestions: true,
        }
    }
}

impl EffectivePolicy {
    /// Resolves a declared policy, using `self` for unset fields.
    pub fn resolve(self, declared: CommandPolicy) -> EffectivePolicy {
        EffectivePolicy {
            throw_on_unexpected_argument: declared
                .throw_on_unexpected_argument
                .unwrap_or(self.throw_on_unexpected_argument),
            response_file_handling: declared
                .response_file_handling
                .unwrap_or(self.response_file_handling),
            allow_argument_separator: declared
                .allow_argument_separator
                .unwrap_or(self.allow_argument_separator),
            name_comparison: declared.name_comparison.unwrap_or(self.name_comparison),
            cluster_options: declared.cluster_options.unwrap_or(self.cluster_options),
            make_suggestions: declared.make_suggestions.unwrap_or(self.make_suggestions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_display_prefers_long() {
        let opt = OptionDefinition::flag(Some("v"), Some("verbose"));
        assert_eq!(opt.display_name(), "--verbose");

        let short_only = OptionDefinition::flag(Some("v"), None);
        assert_eq!(short_only.display_name(), "-v");
        assert_eq!(short_only.canonical_name(), "v");
    }

    #[test]
    fn test_option_matches_name_forms() {
        let opt = OptionDefinition::valued(Some("p"), Some("port"), OptionArity::Single);
        let cmp = NameComparison::Ordinal;

        assert!(opt.matches_name("--port", cmp));
        assert!(opt.matches_name("-p", cmp));
        assert!(opt.matches_name("port", cmp));
        assert!(opt.matches_name("p", cmp));
        assert!(!opt.matches_name("--p", cmp));
        assert!(!opt.matches_name("-port", cmp));
        assert!(!opt.matches_name("--PORT", cmp));
        assert!(opt.matches_name("--PORT", NameComparison::IgnoreCase));
    }

    #[test]
    fn test_option_collision_checks_both_forms() {
        let cmp = NameComparison::Ordinal;
        let a = OptionDefinition::flag(Some("v"), Some("verbose"));
        let b = OptionDefinition::flag(Some("v"), Some("version"));
        let c = OptionDefinition::flag(None, Some("Verbose"));

        assert!(a.collides_with(&b, cmp));
        assert!(!a.collides_with(&c, cmp));
        assert!(a.collides_with(&c, NameComparison::IgnoreCase));
    }

    #[test]
    fn test_multi_char_short_detection() {
        assert!(OptionDefinition::flag(Some("vv"), None).has_multi_char_short());
        assert!(!OptionDefinition::flag(Some("v"), None).has_multi_char_short());
        assert!(!OptionDefinition::flag(None, Some("verbose")).has_multi_char_short());
    }

    #[test]
    fn test_policy_or_fills_unset_fields() {
        let child = CommandPolicy::default().with_allow_argument_separator(true);
        let parent = CommandPolicy::default()
            .with_allow_argument_separator(false)
            .with_throw_on_unexpected_argument(false);

        let merged = child.or(parent);
        assert_eq!(merged.allow_argument_separator, Some(true));
        assert_eq!(merged.throw_on_unexpected_argument, Some(false));
        assert_eq!(merged.cluster_options, None);
    }

    #[test]
    fn test_effective_policy_defaults() {
        let policy = EffectivePolicy::default().resolve(CommandPolicy::default());
        assert!(policy.throw_on_unexpected_argument);
        assert!(policy.cluster_options);
        assert!(!policy.allow_argument_separator);
        assert_eq!(policy.response_file_handling, ResponseFileHandling::Disabled);
        assert_eq!(policy.name_comparison, NameComparison::Ordinal);
    }

    #[test]
    fn test_policy_deserializes_partial_block() {
        let policy: CommandPolicy =
            serde_json::from_str(r#"{"response_file_handling":"line_separated"}"#).unwrap();
        assert_eq!(
            policy.response_file_handling,
            Some(ResponseFileHandling::LineSeparated)
        );
        assert_eq!(policy.cluster_options, None);
    }
}

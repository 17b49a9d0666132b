//! Option templates such as `-p|--port <PORT>`.
//!
//! A template lists the names of an option separated by `|` or whitespace,
//! optionally followed by a `<VALUE>` symbol. The symbol may also be attached
//! to the long name with `=` or `:` (`--port=<PORT>`).

use std::str::FromStr;

use crate::validate::DefinitionError;
use crate::{OptionArity, OptionDefinition, OptionRole};

/// The names and value symbol parsed from a template string.
///
/// # Examples
///
/// ```
/// use argtree_core::OptionTemplate;
///
/// let t: OptionTemplate = "-p|--port <PORT>".parse().unwrap();
/// assert_eq!(t.short.as_deref(), Some("p"));
/// assert_eq!(t.long.as_deref(), Some("port"));
/// assert_eq!(t.value_name.as_deref(), Some("PORT"));
///
/// assert!("verbose".parse::<OptionTemplate>().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTemplate {
    pub short: Option<String>,
    pub long: Option<String>,
    pub value_name: Option<String>,
}

impl FromStr for OptionTemplate {
    type Err = DefinitionError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DefinitionError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut parsed = OptionTemplate::default();
        let parts = template
            .split(|c: char| c == '|' || c.is_whitespace())
            .filter(|p| !p.is_empty());

        for part in parts {
            if let Some(symbol) = part.strip_prefix('<') {
                let symbol = symbol
                    .strip_suffix('>')
                    .ok_or_else(|| invalid("unterminated value symbol"))?;
                set_once(&mut parsed.value_name, symbol, || invalid("value symbol given twice"))?;
            } else if let Some(long) = part.strip_prefix("--") {
                let (name, symbol) = split_attached_symbol(long);
                if name.is_empty() {
                    return Err(invalid("empty long name"));
                }
                set_once(&mut parsed.long, name, || invalid("long name given twice"))?;
                if let Some(symbol) = symbol {
                    let symbol = symbol
                        .strip_prefix('<')
                        .and_then(|s| s.strip_suffix('>'))
                        .ok_or_else(|| invalid("malformed value symbol"))?;
                    set_once(&mut parsed.value_name, symbol, || invalid("value symbol given twice"))?;
                }
            } else if let Some(short) = part.strip_prefix('-') {
                if short.is_empty() {
                    return Err(invalid("empty short name"));
                }
                set_once(&mut parsed.short, short, || invalid("short name given twice"))?;
            } else {
                return Err(invalid(&format!("unexpected part '{part}'")));
            }
        }

        if parsed.short.is_none() && parsed.long.is_none() {
            return Err(invalid("no option name"));
        }
        if parsed.value_name.as_deref() == Some("") {
            return Err(invalid("empty value symbol"));
        }
        Ok(parsed)
    }
}

fn split_attached_symbol(long: &str) -> (&str, Option<&str>) {
    match long.find(['=', ':']) {
        Some(at) => (&long[..at], Some(&long[at + 1..])),
        None => (long, None),
    }
}

fn set_once(
    slot: &mut Option<String>,
    value: &str,
    err: impl FnOnce() -> DefinitionError,
) -> Result<(), DefinitionError> {
    if slot.is_some() {
        return Err(err());
    }
    *slot = Some(value.to_string());
    Ok(())
}

impl OptionDefinition {
    /// Builds an option from a template string.
    ///
    /// The arity is `Single` when the template names a value symbol and
    /// `NoValue` otherwise; use [`with_arity`](Self::with_arity) to change it.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{OptionArity, OptionDefinition};
    ///
    /// let port = OptionDefinition::from_template("-p|--port <PORT>").unwrap();
    /// assert_eq!(port.arity, OptionArity::Single);
    ///
    /// let tags = OptionDefinition::from_template("-t|--tag <TAG>")
    ///     .unwrap()
    ///     .with_arity(OptionArity::Multiple);
    /// assert_eq!(tags.arity, OptionArity::Multiple);
    ///
    /// let force = OptionDefinition::from_template("-f|--force").unwrap();
    /// assert_eq!(force.arity, OptionArity::NoValue);
    /// ```
    pub fn from_template(template: &str) -> Result<Self, DefinitionError> {
        let parsed: OptionTemplate = template.parse()?;
        let arity = if parsed.value_name.is_some() {
            OptionArity::Single
        } else {
            OptionArity::NoValue
        };
        Ok(Self {
            long: parsed.long,
            short: parsed.short,
            value_name: parsed.value_name,
            description: None,
            arity,
            inherited: false,
            role: OptionRole::Regular,
        })
    }

    /// Builds a help option (`-h|--help` style) from a template.
    pub fn help(template: &str) -> Result<Self, DefinitionError> {
        Ok(Self::from_template(template)?
            .with_arity(OptionArity::NoValue)
            .with_role(OptionRole::Help))
    }

    /// Builds a version option (`-V|--version` style) from a template.
    pub fn version(template: &str) -> Result<Self, DefinitionError> {
        Ok(Self::from_template(template)?
            .with_arity(OptionArity::NoValue)
            .with_role(OptionRole::Version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_long_and_symbol() {
        let t: OptionTemplate = "-o|--output <FILE>".parse().unwrap();
        assert_eq!(
            t,
            OptionTemplate {
                short: Some("o".to_string()),
                long: Some("output".to_string()),
                value_name: Some("FILE".to_string()),
            }
        );
    }

    #[test]
    fn test_parses_attached_symbol() {
        let t: OptionTemplate = "--level=<N>".parse().unwrap();
        assert_eq!(t.long.as_deref(), Some("level"));
        assert_eq!(t.value_name.as_deref(), Some("N"));

        let t: OptionTemplate = "-l --level:<N>".parse().unwrap();
        assert_eq!(t.short.as_deref(), Some("l"));
        assert_eq!(t.value_name.as_deref(), Some("N"));
    }

    #[test]
    fn test_accepts_multi_char_short() {
        let t: OptionTemplate = "-vv|--very-verbose".parse().unwrap();
        assert_eq!(t.short.as_deref(), Some("vv"));
        assert_eq!(t.value_name, None);
    }

    #[test]
    fn test_rejects_malformed_templates() {
        for bad in ["", "-", "--", "port", "<PORT>", "-p|-q", "--a|--b", "-p <PORT", "-p <>", "--p=PORT"] {
            assert!(
                bad.parse::<OptionTemplate>().is_err(),
                "template {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_help_and_version_roles() {
        let help = OptionDefinition::help("-?|-h|--help").unwrap_err();
        assert!(matches!(help, DefinitionError::InvalidTemplate { .. }));

        let help = OptionDefinition::help("-h|--help").unwrap();
        assert_eq!(help.role, OptionRole::Help);
        assert_eq!(help.arity, OptionArity::NoValue);

        let version = OptionDefinition::version("--version").unwrap();
        assert_eq!(version.role, OptionRole::Version);
    }
}

//! Option matching, including short-option clustering.

use argtree_core::{
    CommandId, CommandTree, EffectivePolicy, NameComparison, OptionArity, OptionDefinition,
    OptionId, OptionRole, VisibleOption,
};

use crate::error::ParseError;

/// One option occurrence found in a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionMatch {
    pub id: OptionId,
    pub value: Option<String>,
    pub role: OptionRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatchOutcome {
    /// Every occurrence in the token, in order.
    Matched(Vec<OptionMatch>),
    /// The token names no visible option. Nothing was consumed.
    Unknown,
}

/// Matches option tokens against the options visible at one command.
#[derive(Debug)]
pub(crate) struct OptionMatcher<'t> {
    visible: Vec<VisibleOption<'t>>,
    cmp: NameComparison,
    clustering: bool,
    command: String,
}

impl<'t> OptionMatcher<'t> {
    pub(crate) fn new(tree: &'t CommandTree, id: CommandId, policy: &EffectivePolicy) -> Self {
        Self {
            visible: tree.visible_options(id),
            cmp: policy.name_comparison,
            clustering: policy.cluster_options,
            command: tree.display_path(id),
        }
    }

    pub(crate) fn visible(&self) -> &[VisibleOption<'t>] {
        &self.visible
    }

    /// Matches `--name[=value]`. `next` pulls the following token when the
    /// option needs a separate value.
    pub(crate) fn match_long<F>(
        &self,
        name: &str,
        inline: Option<&str>,
        next: F,
    ) -> Result<MatchOutcome, ParseError>
    where
        F: FnOnce() -> Result<Option<String>, ParseError>,
    {
        let Some(option) = self.visible.iter().find(|v| v.definition.matches_long(name, self.cmp))
        else {
            return Ok(MatchOutcome::Unknown);
        };
        let value = self.bind_value(option.definition, inline, next)?;
        Ok(MatchOutcome::Matched(vec![self.occurrence(option, value)]))
    }

    /// Matches `-x...`, clustered or as a whole short name depending on the
    /// command's policy.
    pub(crate) fn match_short<F>(
        &self,
        body: &str,
        name: &str,
        inline: Option<&str>,
        next: F,
    ) -> Result<MatchOutcome, ParseError>
    where
        F: FnOnce() -> Result<Option<String>, ParseError>,
    {
        if self.clustering {
            return self.match_cluster(body, next);
        }
        let Some(option) = self.visible.iter().find(|v| v.definition.matches_short(name, self.cmp))
        else {
            return Ok(MatchOutcome::Unknown);
        };
        let value = self.bind_value(option.definition, inline, next)?;
        Ok(MatchOutcome::Matched(vec![self.occurrence(option, value)]))
    }

    // Scans `-abcXvalue` one character at a time. The first value-taking
    // option ends the scan and owns the rest of the body.
    fn match_cluster<F>(&self, body: &str, next: F) -> Result<MatchOutcome, ParseError>
    where
        F: FnOnce() -> Result<Option<String>, ParseError>,
    {
        let mut matches = Vec::new();
        let mut buf = [0u8; 4];

        for (at, c) in body.char_indices() {
            let short: &str = c.encode_utf8(&mut buf);
            let Some(option) = self
                .visible
                .iter()
                .find(|v| v.definition.matches_short(short, self.cmp))
            else {
                return Ok(MatchOutcome::Unknown);
            };

            let rest = &body[at + c.len_utf8()..];
            let definition = option.definition;

            if !definition.arity.takes_value() {
                if let Some(value) = rest.strip_prefix(['=', ':']) {
                    return Err(self.unexpected_value(definition, value));
                }
                matches.push(self.occurrence(option, None));
                continue;
            }

            let value = if rest.is_empty() {
                self.bind_value(definition, None, next)?
            } else {
                Some(rest.strip_prefix(['=', ':']).unwrap_or(rest).to_string())
            };
            matches.push(self.occurrence(option, value));
            return Ok(MatchOutcome::Matched(matches));
        }

        Ok(MatchOutcome::Matched(matches))
    }

    fn bind_value<F>(
        &self,
        definition: &OptionDefinition,
        inline: Option<&str>,
        next: F,
    ) -> Result<Option<String>, ParseError>
    where
        F: FnOnce() -> Result<Option<String>, ParseError>,
    {
        match (definition.arity, inline) {
            (OptionArity::NoValue, Some(value)) => Err(self.unexpected_value(definition, value)),
            (OptionArity::NoValue, None) => Ok(None),
            (_, Some(value)) => Ok(Some(value.to_string())),
            (OptionArity::OptionalSingle, None) => Ok(None),
            (OptionArity::Single | OptionArity::Multiple, None) => match next()? {
                Some(value) => Ok(Some(value)),
                None => Err(ParseError::MissingOptionValue {
                    option: definition.display_name(),
                    command: self.command.clone(),
                }),
            },
        }
    }

    fn occurrence(&self, option: &VisibleOption<'_>, value: Option<String>) -> OptionMatch {
        OptionMatch {
            id: option.id,
            value,
            role: option.definition.role,
        }
    }

    fn unexpected_value(&self, definition: &OptionDefinition, value: &str) -> ParseError {
        ParseError::UnexpectedOptionValue {
            option: definition.display_name(),
            value: value.to_string(),
            command: self.command.clone(),
        }
    }
}

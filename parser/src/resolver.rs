//! The token-driven walk down the command tree.
//!
//! The resolver pulls one token at a time. A positional token first tries to
//! descend into a child command, then fills the next free argument slot. An
//! option token goes to the [`OptionMatcher`] of the current command. Once a
//! separator, an information option or (under a lenient policy) an
//! unexpected token is seen, every following token goes to the remainder.

use std::path::Path;

use argtree_core::{ArgumentId, CommandId, CommandTree, EffectivePolicy, OptionRole};
use tracing::{debug, trace};

use crate::binding::Bindings;
use crate::error::{ParseError, UnexpectedKind};
use crate::matcher::{MatchOutcome, OptionMatcher};
use crate::response_file::TokenStream;
use crate::result::InformationRequest;
use crate::suggest::{suggest, suggest_options};
use crate::token::Token;

/// Structural outcome of a parse, before validation.
#[derive(Debug)]
pub(crate) struct Resolution {
    pub chain: Vec<CommandId>,
    pub remainder: Vec<String>,
    pub bindings: Bindings,
    pub information: Option<InformationRequest>,
}

pub(crate) fn resolve(
    tree: &CommandTree,
    tokens: TokenStream,
    working_dir: &Path,
) -> Result<Resolution, ParseError> {
    let root = tree.root();
    let policy = tree.effective_policy(root);
    let mut resolver = Resolver {
        tree,
        working_dir,
        matcher: OptionMatcher::new(tree, root, &policy),
        policy,
        tokens,
        chain: vec![root],
        next_argument: 0,
        bindings: Bindings::default(),
        remainder: Vec::new(),
        information: None,
    };
    resolver.run()?;
    Ok(Resolution {
        chain: resolver.chain,
        remainder: resolver.remainder,
        bindings: resolver.bindings,
        information: resolver.information,
    })
}

struct Resolver<'t, 'p> {
    tree: &'t CommandTree,
    working_dir: &'p Path,
    policy: EffectivePolicy,
    matcher: OptionMatcher<'t>,
    tokens: TokenStream,
    chain: Vec<CommandId>,
    next_argument: usize,
    bindings: Bindings,
    remainder: Vec<String>,
    information: Option<InformationRequest>,
}

impl Resolver<'_, '_> {
    fn current(&self) -> CommandId {
        self.chain.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(raw) = self
            .tokens
            .next(self.policy.response_file_handling, self.working_dir)?
        {
            trace!(token = %raw, command = %self.tree.display_path(self.current()), "Resolving token");
            match Token::classify(&raw) {
                Token::Separator => self.separator(&raw)?,
                Token::Positional(text) => self.positional(text)?,
                token @ (Token::Long { .. } | Token::Short { .. }) => self.option(&raw, token)?,
            }
        }
        Ok(())
    }

    fn separator(&mut self, raw: &str) -> Result<(), ParseError> {
        if !self.policy.allow_argument_separator {
            return self.unexpected(raw, UnexpectedKind::Separator);
        }
        debug!(command = %self.tree.display_path(self.current()), "Argument separator, collecting remainder");
        self.remainder.extend(self.tokens.drain());
        Ok(())
    }

    fn positional(&mut self, text: &str) -> Result<(), ParseError> {
        let current = self.current();
        if let Some(child) = self.tree.find_child(current, text) {
            self.descend(child);
            return Ok(());
        }

        let arguments = self.tree.node(current).arguments();
        let Some(argument) = arguments.get(self.next_argument) else {
            return self.unexpected(text, UnexpectedKind::Argument);
        };
        let id = ArgumentId {
            command: current,
            index: self.next_argument,
        };
        trace!(argument = %argument.name, value = %text, "Bound argument");
        self.bindings.push_argument(id, text.to_string());
        if !argument.multiple {
            self.next_argument += 1;
        }
        Ok(())
    }

    fn option(&mut self, raw: &str, token: Token<'_>) -> Result<(), ParseError> {
        let handling = self.policy.response_file_handling;
        let working_dir = self.working_dir;
        let tokens = &mut self.tokens;
        let next = || tokens.next(handling, working_dir);

        let outcome = match token {
            Token::Long { name, value } => self.matcher.match_long(name, value, next)?,
            Token::Short { body, name, value } => self.matcher.match_short(body, name, value, next)?,
            Token::Separator | Token::Positional(_) => MatchOutcome::Unknown,
        };

        let MatchOutcome::Matched(matches) = outcome else {
            return self.unexpected(raw, UnexpectedKind::Option);
        };

        let mut information = None;
        for m in matches {
            debug!(
                option = %self.tree.option(m.id).display_name(),
                value = m.value.as_deref().unwrap_or(""),
                "Matched option"
            );
            information = information.or(match m.role {
                OptionRole::Help => Some(InformationRequest::Help),
                OptionRole::Version => Some(InformationRequest::Version),
                OptionRole::Regular => None,
            });
            self.bindings.record_option(m.id, m.value);
        }

        if let Some(request) = information {
            debug!(?request, "Information requested, stopping");
            self.information = Some(request);
            self.remainder.extend(self.tokens.drain());
        }
        Ok(())
    }

    fn descend(&mut self, child: CommandId) {
        self.chain.push(child);
        self.policy = self.tree.effective_policy(child);
        self.matcher = OptionMatcher::new(self.tree, child, &self.policy);
        self.next_argument = 0;
        debug!(command = %self.tree.display_path(child), "Selected command");
    }

    fn unexpected(&mut self, raw: &str, kind: UnexpectedKind) -> Result<(), ParseError> {
        let current = self.current();
        if self.policy.throw_on_unexpected_argument {
            let suggestions = if !self.policy.make_suggestions {
                Vec::new()
            } else {
                match kind {
                    UnexpectedKind::Option => suggest_options(raw, self.matcher.visible()),
                    UnexpectedKind::Argument => suggest(raw, self.tree.child_names(current)),
                    UnexpectedKind::Separator => Vec::new(),
                }
            };
            return Err(ParseError::UnexpectedArgument {
                token: raw.to_string(),
                command: self.tree.display_path(current),
                kind,
                suggestions,
            });
        }

        debug!(token = %raw, command = %self.tree.display_path(current), "Unexpected token, collecting remainder");
        self.remainder.push(raw.to_string());
        self.remainder.extend(self.tokens.drain());
        Ok(())
    }
}

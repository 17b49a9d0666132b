//! Arena-backed command tree.
//!
//! Commands live in a flat arena owned by [`CommandTree`] and are addressed
//! by [`CommandId`]. A child stores its parent's id, never a handle to it, so
//! the tree has no ownership cycles and can be cloned or shared freely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::validate::{self, Ambiguity, DefinitionError};
use crate::{ArgumentDefinition, CommandPolicy, EffectivePolicy, NameComparison, OptionDefinition};

/// Stable index of a command inside its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(usize);

impl CommandId {
    /// Position of the command in the arena (the root is `0`).
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity of an option: declaring command plus declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId {
    pub command: CommandId,
    pub index: usize,
}

/// Identity of an argument: declaring command plus declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArgumentId {
    pub command: CommandId,
    pub index: usize,
}

/// An option as seen from one command: its own or inherited from an ancestor.
#[derive(Debug, Clone, Copy)]
pub struct VisibleOption<'a> {
    pub id: OptionId,
    pub definition: &'a OptionDefinition,
}

/// One command in the tree.
#[derive(Debug, Clone)]
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    options: Vec<OptionDefinition>,
    arguments: Vec<ArgumentDefinition>,
    children: Vec<CommandId>,
    parent: Option<CommandId>,
    policy: CommandPolicy,
}

impl CommandNode {
    fn new(name: &str, parent: Option<CommandId>) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            options: Vec::new(),
            arguments: Vec::new(),
            children: Vec::new(),
            parent,
            policy: CommandPolicy::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Options declared directly on this command, in declaration order.
    pub fn options(&self) -> &[OptionDefinition] {
        &self.options
    }

    pub fn arguments(&self) -> &[ArgumentDefinition] {
        &self.arguments
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    /// The policy as declared here, without inheritance applied.
    pub fn policy(&self) -> CommandPolicy {
        self.policy
    }

    fn answers_to(&self, token: &str, cmp: NameComparison) -> bool {
        self.names().any(|n| cmp.matches(n, token))
    }
}

/// A tree of command definitions.
///
/// Mutations are checked as they are made: colliding names, misplaced
/// multiple-value arguments and contradictory clustering settings are
/// rejected with a [`DefinitionError`] instead of surfacing at parse time.
///
/// # Examples
///
/// ```
/// use argtree_core::*;
///
/// let mut tree = CommandTree::new("app");
/// let root = tree.root();
/// tree.add_option(root, OptionDefinition::flag(Some("v"), Some("verbose")).inherited())
///     .unwrap();
///
/// let serve = tree.add_command(root, "serve").unwrap();
/// tree.add_alias(serve, "s").unwrap();
/// tree.add_option(
///     serve,
///     OptionDefinition::valued(Some("p"), Some("port"), OptionArity::Single),
/// )
/// .unwrap();
///
/// assert_eq!(tree.find_child(root, "s"), Some(serve));
/// assert_eq!(tree.display_path(serve), "app serve");
/// // own --port plus the inherited --verbose
/// assert_eq!(tree.visible_options(serve).len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    defaults: EffectivePolicy,
}

impl CommandTree {
    /// Creates a tree holding only a root command.
    pub fn new(root_name: &str) -> Self {
        Self::with_defaults(root_name, EffectivePolicy::default())
    }

    /// Creates a tree whose unset policy fields fall back to `defaults`.
    pub fn with_defaults(root_name: &str, defaults: EffectivePolicy) -> Self {
        Self {
            nodes: vec![CommandNode::new(root_name, None)],
            defaults,
        }
    }

    pub fn root(&self) -> CommandId {
        CommandId(0)
    }

    pub fn defaults(&self) -> EffectivePolicy {
        self.defaults
    }

    /// Number of commands, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every command id in creation order (parents before children).
    pub fn ids(&self) -> impl Iterator<Item = CommandId> + '_ {
        (0..self.nodes.len()).map(CommandId)
    }

    /// Returns the command for `id`, or `None` for an id from another tree.
    pub fn get(&self, id: CommandId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    /// Returns the command for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: CommandId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn option(&self, id: OptionId) -> &OptionDefinition {
        &self.node(id.command).options[id.index]
    }

    pub fn argument(&self, id: ArgumentId) -> &ArgumentDefinition {
        &self.node(id.command).arguments[id.index]
    }

    /// Adds a child command under `parent`.
    pub fn add_command(&mut self, parent: CommandId, name: &str) -> Result<CommandId, DefinitionError> {
        validate::check_command_name(name)?;
        self.check_sibling_name(parent, None, name)?;

        let id = CommandId(self.nodes.len());
        self.nodes.push(CommandNode::new(name, Some(parent)));
        self.nodes[parent.0].children.push(id);
        debug!(parent = %self.display_path(parent), command = name, "Added command");
        Ok(id)
    }

    /// Adds another name the command answers to.
    pub fn add_alias(&mut self, id: CommandId, alias: &str) -> Result<(), DefinitionError> {
        validate::check_command_name(alias)?;
        if let Some(parent) = self.node(id).parent {
            self.check_sibling_name(parent, Some(id), alias)?;
        }
        self.nodes[id.0].aliases.push(alias.to_string());
        Ok(())
    }

    pub fn set_description(&mut self, id: CommandId, description: &str) {
        self.nodes[id.0].description = Some(description.to_string());
    }

    /// Replaces the declared policy of a command.
    ///
    /// Fails, leaving the old policy in place, if the new policy explicitly
    /// enables clustering while a multi-character short name is visible, or
    /// if its comparison mode makes option or sibling names collide at `id`
    /// or any command below it.
    pub fn set_policy(&mut self, id: CommandId, policy: CommandPolicy) -> Result<(), DefinitionError> {
        let previous = std::mem::replace(&mut self.nodes[id.0].policy, policy);

        let mut affected = vec![id];
        affected.extend(self.descendants(id));
        let outcome = validate::check_clustering(self, id).and_then(|()| {
            affected
                .iter()
                .try_for_each(|&c| validate::check_name_collisions(self, c))
        });

        if let Err(e) = outcome {
            debug!(command = %self.display_path(id), error = %e, "Rejected policy");
            self.nodes[id.0].policy = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Declares an option on a command.
    pub fn add_option(
        &mut self,
        id: CommandId,
        option: OptionDefinition,
    ) -> Result<OptionId, DefinitionError> {
        let command = self.display_path(id);
        validate::check_option_names(&command, &option)?;

        let cmp = self.effective_policy(id).name_comparison;
        if let Some(existing) = self.node(id).options.iter().find(|o| o.collides_with(&option, cmp)) {
            debug!(command = %command, existing = %existing.display_name(), "Rejected duplicate option");
            return Err(DefinitionError::AmbiguousOptionDefinition {
                command,
                option: option.display_name(),
                reason: Ambiguity::DuplicateName,
            });
        }

        let affects_descendants = option.inherited;
        let index = self.nodes[id.0].options.len();
        self.nodes[id.0].options.push(option);

        let mut affected = vec![id];
        if affects_descendants {
            affected.extend(self.descendants(id));
        }
        if let Some(err) = affected
            .into_iter()
            .find_map(|c| validate::check_clustering(self, c).err())
        {
            self.nodes[id.0].options.pop();
            return Err(err);
        }

        Ok(OptionId { command: id, index })
    }

    /// Declares a positional argument on a command.
    pub fn add_argument(
        &mut self,
        id: CommandId,
        argument: ArgumentDefinition,
    ) -> Result<ArgumentId, DefinitionError> {
        let node = self.node(id);
        if argument.name.trim().is_empty() {
            return Err(DefinitionError::InvalidName {
                kind: "argument",
                name: argument.name,
            });
        }
        if node.arguments.iter().any(|a| a.name == argument.name) {
            return Err(DefinitionError::DuplicateArgument {
                command: self.display_path(id),
                name: argument.name,
            });
        }
        if let Some(last) = node.arguments.last().filter(|a| a.multiple) {
            return Err(DefinitionError::MultipleValueArgumentNotLast {
                command: self.display_path(id),
                name: argument.name,
                multiple: last.name.clone(),
            });
        }

        let index = node.arguments.len();
        self.nodes[id.0].arguments.push(argument);
        Ok(ArgumentId { command: id, index })
    }

    /// `id`, then its parent, up to the root.
    pub fn ancestors(&self, id: CommandId) -> impl Iterator<Item = CommandId> + '_ {
        std::iter::successors(Some(id), |&c| self.node(c).parent)
    }

    /// Every command below `id`, depth first.
    pub fn descendants(&self, id: CommandId) -> Vec<CommandId> {
        let mut out = Vec::new();
        let mut stack: Vec<CommandId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev());
        }
        out
    }

    /// Command names from the root down to `id`.
    pub fn path(&self, id: CommandId) -> Vec<&str> {
        let mut names: Vec<&str> = self.ancestors(id).map(|c| self.node(c).name()).collect();
        names.reverse();
        names
    }

    /// Space separated [`path`](Self::path), e.g. `"git remote add"`.
    pub fn display_path(&self, id: CommandId) -> String {
        self.path(id).join(" ")
    }

    /// Resolves the policy of `id` through its ancestor chain.
    ///
    /// Clustering is reported as disabled whenever a multi-character short
    /// name is visible at `id`.
    pub fn effective_policy(&self, id: CommandId) -> EffectivePolicy {
        let declared = self
            .ancestors(id)
            .map(|c| self.node(c).policy)
            .fold(CommandPolicy::default(), CommandPolicy::or);
        let mut policy = self.defaults.resolve(declared);

        if policy.cluster_options
            && self
                .visible_options(id)
                .iter()
                .any(|v| v.definition.has_multi_char_short())
        {
            trace!(command = %self.display_path(id), "Clustering disabled by multi-character short name");
            policy.cluster_options = false;
        }
        policy
    }

    /// Options matchable at `id`: its own, then inherited ones from each
    /// ancestor, nearest first. An inherited option is hidden when one
    /// already visible shares its long or short name.
    pub fn visible_options(&self, id: CommandId) -> Vec<VisibleOption<'_>> {
        let cmp = self.name_comparison_uncached(id);
        let mut visible: Vec<VisibleOption<'_>> = self
            .node(id)
            .options
            .iter()
            .enumerate()
            .map(|(index, definition)| VisibleOption {
                id: OptionId { command: id, index },
                definition,
            })
            .collect();

        for ancestor in self.ancestors(id).skip(1) {
            for (index, definition) in self.node(ancestor).options.iter().enumerate() {
                if !definition.inherited {
                    continue;
                }
                if visible.iter().any(|v| v.definition.collides_with(definition, cmp)) {
                    continue;
                }
                visible.push(VisibleOption {
                    id: OptionId {
                        command: ancestor,
                        index,
                    },
                    definition,
                });
            }
        }

        visible
    }

    /// Finds a visible option by `--long`, `-s`, or bare name.
    pub fn find_option(&self, id: CommandId, name: &str) -> Option<VisibleOption<'_>> {
        let cmp = self.name_comparison_uncached(id);
        self.visible_options(id)
            .into_iter()
            .find(|v| v.definition.matches_name(name, cmp))
    }

    /// Finds an argument declared on `id` by name.
    pub fn find_argument(&self, id: CommandId, name: &str) -> Option<ArgumentId> {
        self.node(id)
            .arguments
            .iter()
            .position(|a| a.name == name)
            .map(|index| ArgumentId { command: id, index })
    }

    /// Finds a direct child answering to `token` under the comparison mode of
    /// `id`. Only whole names match.
    pub fn find_child(&self, id: CommandId, token: &str) -> Option<CommandId> {
        let cmp = self.name_comparison_uncached(id);
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).answers_to(token, cmp))
    }

    /// Names and aliases of every direct child of `id`.
    pub fn child_names(&self, id: CommandId) -> Vec<&str> {
        self.node(id)
            .children
            .iter()
            .flat_map(|&c| self.node(c).names())
            .collect()
    }

    // Comparison mode without the visible-options scan done by effective_policy.
    fn name_comparison_uncached(&self, id: CommandId) -> NameComparison {
        self.ancestors(id)
            .find_map(|c| self.node(c).policy.name_comparison)
            .unwrap_or(self.defaults.name_comparison)
    }

    fn check_sibling_name(
        &self,
        parent: CommandId,
        except: Option<CommandId>,
        name: &str,
    ) -> Result<(), DefinitionError> {
        let cmp = self.name_comparison_uncached(parent);
        let mut taken: HashSet<String> = HashSet::new();
        for &child in self.node(parent).children.iter().filter(|&&c| Some(c) != except) {
            taken.extend(self.node(child).names().map(|n| cmp.normalize(n).into_owned()));
        }
        // An alias may not repeat the command's own names either.
        if let Some(own) = except {
            taken.extend(self.node(own).names().map(|n| cmp.normalize(n).into_owned()));
        }

        if taken.contains(cmp.normalize(name).as_ref()) {
            return Err(DefinitionError::DuplicateCommand {
                parent: self.display_path(parent),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

//! Declarative command-line model for the argtree parsing engine.
//!
//! This crate defines what a command line *may* contain; the
//! `argtree-parser` crate decides what a given argv *does* contain.
//!
//! - [`CommandTree`] — arena of commands addressed by [`CommandId`], with
//!   parent back-references stored as ids.
//! - [`OptionDefinition`] — a named option with short/long forms, an
//!   [`OptionArity`], and an `inherited` flag.
//! - [`ArgumentDefinition`] — a positional argument; the last one may accept
//!   multiple values.
//! - [`CommandPolicy`] — per-command parsing policy where every unset field
//!   is inherited from the parent, resolved into an [`EffectivePolicy`].
//! - [`CommandDefinition`] — a serde document describing a whole tree,
//!   loadable from YAML or JSON.
//!
//! Trees are validated while they are built: ambiguous option names,
//! colliding command names and contradictory clustering settings fail with a
//! [`DefinitionError`] at definition time rather than at parse time.
//!
//! # Example
//!
//! ```
//! use argtree_core::*;
//!
//! let mut tree = CommandTree::new("app");
//! let root = tree.root();
//! tree.add_option(root, OptionDefinition::from_template("-v|--verbose").unwrap().inherited())
//!     .unwrap();
//!
//! let serve = tree.add_command(root, "serve").unwrap();
//! tree.add_option(serve, OptionDefinition::from_template("-p|--port <PORT>").unwrap())
//!     .unwrap();
//! tree.add_argument(serve, ArgumentDefinition::multiple("files")).unwrap();
//!
//! assert!(tree.find_option(serve, "-v").is_some());
//! assert!(tree.effective_policy(serve).cluster_options);
//! assert!(validate_tree(&tree).is_empty());
//! ```

mod definition;
mod error;
mod template;
mod tree;
mod types;
mod validate;

pub use definition::{ArgumentSpec, CommandDefinition, OptionSpec};
pub use error::{LoadError, Result};
pub use template::OptionTemplate;
pub use tree::{ArgumentId, CommandId, CommandNode, CommandTree, OptionId, VisibleOption};
pub use types::*;
pub use validate::{Ambiguity, DefinitionError, validate_tree};

//! Serializable command definition documents.
//!
//! A [`CommandDefinition`] describes a whole command tree as nested data, so
//! an application can keep its command line in a YAML or JSON file and build
//! the [`CommandTree`] at startup.
//!
//! # Example YAML
//!
//! ```yaml
//! name: app
//! policy:
//!   response_file_handling: space_separated
//! options:
//!   - template: "-v|--verbose"
//!     inherited: true
//!   - template: "-h|--help"
//!     role: help
//! commands:
//!   - name: serve
//!     aliases: [s]
//!     options:
//!       - template: "-p|--port <PORT>"
//!         required: true
//!     arguments:
//!       - name: name
//!       - name: tags
//!         multiple: true
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, Result};
use crate::validate::DefinitionError;
use crate::{
    ArgumentDefinition, CommandId, CommandPolicy, CommandTree, OptionArity, OptionDefinition,
    OptionRole,
};

/// One command of a definition document, with its whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub policy: CommandPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDefinition>,
}

/// An option entry in a definition document.
///
/// Names come from `template`, from `short`/`long`, or both (explicit fields
/// win). The validation hints (`required`, `allowed_values`, `single`) are
/// not part of the tree; the parser crate turns them into validators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<OptionArity>,
    pub inherited: bool,
    pub role: OptionRole,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    pub ignore_case: bool,
    pub single: bool,
}

impl OptionSpec {
    /// Resolves the entry into an [`OptionDefinition`].
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::{OptionArity, OptionSpec};
    ///
    /// let spec = OptionSpec {
    ///     template: Some("-t|--tag <TAG>".into()),
    ///     arity: Some(OptionArity::Multiple),
    ///     ..Default::default()
    /// };
    /// let def = spec.to_definition().unwrap();
    /// assert_eq!(def.short.as_deref(), Some("t"));
    /// assert_eq!(def.arity, OptionArity::Multiple);
    /// ```
    pub fn to_definition(&self) -> std::result::Result<OptionDefinition, DefinitionError> {
        let mut def = match &self.template {
            Some(template) => OptionDefinition::from_template(template)?,
            None => {
                let arity = if self.value_name.is_some() {
                    OptionArity::Single
                } else {
                    OptionArity::NoValue
                };
                OptionDefinition::valued(None, None, arity)
            }
        };

        if self.long.is_some() {
            def.long = self.long.clone();
        }
        if self.short.is_some() {
            def.short = self.short.clone();
        }
        if self.value_name.is_some() {
            def.value_name = self.value_name.clone();
        }
        if let Some(arity) = self.arity {
            def.arity = arity;
        }
        def.description = self.description.clone();
        def.inherited = self.inherited;
        def.role = self.role;
        Ok(def)
    }
}

/// A positional argument entry in a definition document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(default)]
    pub ignore_case: bool,
}

impl ArgumentSpec {
    pub fn to_definition(&self) -> ArgumentDefinition {
        ArgumentDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            multiple: self.multiple,
        }
    }
}

impl CommandDefinition {
    /// Creates a definition with only a name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Loads a definition from a `.yaml`, `.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::IoError`] if the file cannot be read,
    /// [`LoadError::JsonError`] / [`LoadError::YamlError`] if it does not
    /// parse, or [`LoadError::UnsupportedFormat`] for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let definition = match extension.as_deref() {
            Some("json") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_json::from_reader(reader)?
            }
            Some("yaml" | "yml") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_yaml::from_reader(reader)?
            }
            _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(path = %path.display(), "Loaded command definition");
        Ok(definition)
    }

    /// Loads a definition file and builds its tree.
    ///
    /// # Errors
    ///
    /// Everything [`load`](Self::load) can return, plus
    /// [`LoadError::Definition`] when the document describes an invalid tree.
    pub fn load_tree(path: impl AsRef<Path>) -> Result<CommandTree> {
        Ok(Self::load(path)?.build()?)
    }

    /// Parses a definition from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a definition from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the command tree described by this definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use argtree_core::CommandDefinition;
    ///
    /// let def = CommandDefinition::from_yaml_str(r#"
    /// name: app
    /// commands:
    ///   - name: serve
    ///     aliases: [s]
    ///     options:
    ///       - template: "-p|--port <PORT>"
    /// "#).unwrap();
    ///
    /// let tree = def.build().unwrap();
    /// let serve = tree.find_child(tree.root(), "s").unwrap();
    /// assert!(tree.find_option(serve, "--port").is_some());
    /// ```
    pub fn build(&self) -> std::result::Result<CommandTree, DefinitionError> {
        CommandTree::from_definition(self)
    }
}

impl CommandTree {
    /// Builds a tree from a definition document.
    ///
    /// Commands are created depth first in document order, so the ids of a
    /// tree built twice from the same document are identical.
    pub fn from_definition(
        definition: &CommandDefinition,
    ) -> std::result::Result<Self, DefinitionError> {
        crate::validate::check_command_name(&definition.name)?;
        let mut tree = CommandTree::new(&definition.name);
        let root = tree.root();
        populate(&mut tree, root, definition)?;
        Ok(tree)
    }
}

fn populate(
    tree: &mut CommandTree,
    id: CommandId,
    definition: &CommandDefinition,
) -> std::result::Result<(), DefinitionError> {
    // Policy first: it decides the comparison mode for the names below.
    tree.set_policy(id, definition.policy)?;
    if let Some(description) = &definition.description {
        tree.set_description(id, description);
    }
    for alias in &definition.aliases {
        tree.add_alias(id, alias)?;
    }
    for option in &definition.options {
        tree.add_option(id, option.to_definition()?)?;
    }
    for argument in &definition.arguments {
        tree.add_argument(id, argument.to_definition())?;
    }
    for child in &definition.commands {
        let child_id = tree.add_command(id, &child.name)?;
        populate(tree, child_id, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::{NameComparison, ResponseFileHandling};

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
name: app
description: Sample application
policy:
  response_file_handling: space_separated
  name_comparison: ignore_case
options:
  - template: "-v|--verbose"
    inherited: true
  - template: "-h|--help"
    role: help
commands:
  - name: serve
    aliases: [s]
    policy:
      allow_argument_separator: true
    options:
      - long: port
        short: p
        value_name: PORT
        required: true
      - template: "--color <WHEN>"
        arity: optional_single
        allowed_values: [always, never, auto]
    arguments:
      - name: name
      - name: tags
        multiple: true
"#
    }

    #[test]
    fn test_build_from_yaml() {
        let def = CommandDefinition::from_yaml_str(sample_yaml()).unwrap();
        let tree = def.build().unwrap();
        let root = tree.root();

        assert_eq!(tree.node(root).description(), Some("Sample application"));
        let serve = tree.find_child(root, "S").unwrap();
        assert_eq!(tree.node(serve).arguments().len(), 2);

        let port = tree.find_option(serve, "-p").unwrap();
        assert_eq!(port.definition.arity, OptionArity::Single);
        assert_eq!(port.definition.value_name.as_deref(), Some("PORT"));

        let color = tree.find_option(serve, "--color").unwrap();
        assert_eq!(color.definition.arity, OptionArity::OptionalSingle);

        let policy = tree.effective_policy(serve);
        assert!(policy.allow_argument_separator);
        assert_eq!(policy.name_comparison, NameComparison::IgnoreCase);
        assert_eq!(policy.response_file_handling, ResponseFileHandling::SpaceSeparated);
    }

    #[test]
    fn test_build_rejects_invalid_document() {
        let def = CommandDefinition::from_yaml_str(
            r#"
name: app
arguments:
  - name: files
    multiple: true
  - name: extra
"#,
        )
        .unwrap();
        assert!(matches!(
            def.build(),
            Err(DefinitionError::MultipleValueArgumentNotLast { .. })
        ));
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("app.yml");
        std::fs::write(&yaml_path, sample_yaml()).unwrap();
        let from_yaml = CommandDefinition::load(&yaml_path).unwrap();

        let json_path = dir.path().join("app.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        serde_json::to_writer_pretty(&mut f, &from_yaml).unwrap();
        f.flush().unwrap();
        let from_json = CommandDefinition::load(&json_path).unwrap();

        assert_eq!(from_yaml, from_json);

        let txt_path = dir.path().join("app.txt");
        std::fs::write(&txt_path, "name: app").unwrap();
        assert!(matches!(
            CommandDefinition::load(&txt_path),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_tree_reports_invalid_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.yaml");
        std::fs::write(
            &path,
            "name: app\ncommands:\n  - name: run\n  - name: run\n",
        )
        .unwrap();

        let err = CommandDefinition::load_tree(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Definition(DefinitionError::DuplicateCommand { .. })
        ));

        std::fs::write(&path, sample_yaml()).unwrap();
        assert_eq!(CommandDefinition::load_tree(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = CommandDefinition::load("/nonexistent/argtree/app.yaml").unwrap_err();
        assert!(matches!(err, LoadError::IoError(_)));
    }
}

//! A git-style command tree built with the builder API.
//!
//! Shows inherited options, nested subcommands, clustering, response files,
//! the argument separator and validators.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argtree-demos --example git_like -- remote add -v origin https://example.com/repo.git
//! cargo run -p argtree-demos --example git_like -- commit -am "fix parser" -- --not-an-option
//! cargo run -p argtree-demos --example git_like -- psuh
//! ```

use argtree_core::{
    ArgumentDefinition, CommandPolicy, CommandTree, DefinitionError, OptionArity, OptionDefinition,
    ResponseFileHandling,
};
use argtree_parser::{InformationRequest, Parser, Required, SingleValue, ValidationResult};

fn build_tree() -> Result<CommandTree, DefinitionError> {
    let mut tree = CommandTree::new("git");
    let root = tree.root();
    tree.set_policy(
        root,
        CommandPolicy::default().with_response_file_handling(ResponseFileHandling::SpaceSeparated),
    )?;
    tree.add_option(
        root,
        OptionDefinition::from_template("-v|--verbose")?
            .with_description("Be more verbose")
            .inherited(),
    )?;
    tree.add_option(root, OptionDefinition::help("-h|--help")?.inherited())?;
    tree.add_option(root, OptionDefinition::version("--version")?)?;
    tree.add_option(
        root,
        OptionDefinition::from_template("-C <PATH>")?.with_description("Run as if started in PATH"),
    )?;

    let commit = tree.add_command(root, "commit")?;
    tree.add_alias(commit, "ci")?;
    tree.set_policy(commit, CommandPolicy::default().with_allow_argument_separator(true))?;
    tree.add_option(commit, OptionDefinition::from_template("-a|--all")?)?;
    tree.add_option(
        commit,
        OptionDefinition::from_template("-m|--message <MSG>")?.with_arity(OptionArity::Multiple),
    )?;
    tree.add_argument(commit, ArgumentDefinition::multiple("pathspec"))?;

    let push = tree.add_command(root, "push")?;
    tree.add_option(push, OptionDefinition::from_template("-f|--force")?)?;
    tree.add_argument(push, ArgumentDefinition::new("repository"))?;
    tree.add_argument(push, ArgumentDefinition::multiple("refspec"))?;

    let remote = tree.add_command(root, "remote")?;
    let add = tree.add_command(remote, "add")?;
    tree.add_argument(add, ArgumentDefinition::new("name"))?;
    tree.add_argument(add, ArgumentDefinition::new("url"))?;
    tree.add_command(remote, "remove")?;

    Ok(tree)
}

fn build_parser() -> Result<Parser, DefinitionError> {
    let tree = build_tree()?;
    let commit = tree.find_child(tree.root(), "commit");
    let add = tree
        .find_child(tree.root(), "remote")
        .and_then(|remote| tree.find_child(remote, "add"));

    let mut parser = Parser::new(tree);
    if let Some(commit) = commit {
        parser.add_validator(commit, Required::option("--message"));
        parser.add_validator(commit, SingleValue::option("--all"));
    }
    if let Some(add) = add {
        parser.add_validator(add, Required::argument("url"));
        parser.add_validator_fn(add, |result| match result.argument_value("url") {
            Some(url) if !url.contains("://") && !url.contains('@') => {
                ValidationResult::failure("url", format!("'{url}' does not look like a URL"))
            }
            _ => ValidationResult::Success,
        });
    }
    Ok(parser)
}

fn main() {
    let parser = match build_parser() {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match parser.parse(args) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.hint() {
                eprintln!("\n{hint}");
            }
            std::process::exit(1);
        }
    };

    match result.information() {
        Some(InformationRequest::Help) => {
            println!("help requested for '{}'", result.command_path().join(" "));
            return;
        }
        Some(InformationRequest::Version) => {
            println!("git (argtree demo) {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        None => {}
    }

    println!("command:   {}", result.command_path().join(" "));
    println!("verbose:   {}", result.occurrences("--verbose"));
    for message in result.option_values("--message") {
        println!("message:   {message}");
    }
    for (id, values) in result.bound_arguments() {
        println!("{:<10} {}", format!("{}:", result.tree().argument(id).name), values.join(" "));
    }
    if !result.remainder().is_empty() {
        println!("remainder: {}", result.remainder().join(" "));
    }
    if let Some(failure) = result.validation().failure_ref() {
        eprintln!("invalid: {failure}");
        std::process::exit(2);
    }
}

use std::path::{Path, PathBuf};

use argtree_core::{CommandDefinition, ResponseFileHandling};
use argtree_parser::output::{OutputFormat, format_report};
use argtree_parser::{ParseError, Parser as ArgParser, expand_response_files};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for parse and definition errors.
const EXIT_ERROR: i32 = 1;
/// Exit code when parsing succeeded but a validator failed.
const EXIT_INVALID: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "argtree")]
#[command(version)]
#[command(about = "Parse command lines against a declarative command tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments against a definition file and print the bindings.
    Parse(ParseArgs),
    /// Load and check one or more definition files.
    Check(CheckArgs),
    /// Expand response files and print the resulting tokens.
    Expand(ExpandArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Command definition file (.yaml, .yml or .json).
    #[arg(long)]
    definition: PathBuf,
    /// Directory relative response-file paths are resolved against.
    #[arg(long)]
    working_dir: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Arguments to parse, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Command definition files.
    #[arg(required = true)]
    definitions: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ExpandArgs {
    /// Directory relative response-file paths are resolved against.
    #[arg(long)]
    working_dir: Option<PathBuf>,
    /// Treat every line of a response file as one token.
    #[arg(long)]
    line_separated: bool,
    /// Tokens to expand, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

/// A failed run: message for stderr plus the process exit code.
#[derive(Debug)]
struct Failure {
    code: i32,
    message: String,
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self {
            code: EXIT_ERROR,
            message,
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Expand(args) => run_expand(args),
    };

    if let Err(failure) = result {
        eprintln!("error: {}", failure.message);
        std::process::exit(failure.code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ARGTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_definition(path: &Path) -> Result<CommandDefinition, String> {
    CommandDefinition::load(path).map_err(|e| format!("failed to load {}: {e}", path.display()))
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let definition = load_definition(&args.definition)?;
    let mut parser = ArgParser::from_definition(&definition)
        .map_err(|e| format!("invalid definition {}: {e}", args.definition.display()))?;
    if let Some(dir) = args.working_dir {
        parser = parser.with_working_directory(dir);
    }
    debug!(definition = %args.definition.display(), tokens = args.args.len(), "Parsing");

    let result = parser.parse(&args.args).map_err(describe_parse_error)?;
    let report = result.report();
    let rendered = format_report(&report, args.format)?;
    println!("{}", rendered.trim_end());

    match result.validation().failure_ref() {
        None => Ok(()),
        Some(failure) => Err(Failure {
            code: EXIT_INVALID,
            message: failure.message.clone(),
        }),
    }
}

fn describe_parse_error(err: ParseError) -> Failure {
    let code = match err {
        ParseError::ValidationFailure(_) => EXIT_INVALID,
        _ => EXIT_ERROR,
    };
    let message = match err.hint() {
        Some(hint) => format!("{err}\n\n{hint}"),
        None => err.to_string(),
    };
    Failure { code, message }
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    let mut failures = 0usize;
    for path in &args.definitions {
        match CommandDefinition::load_tree(path) {
            Ok(tree) => println!("ok: {} ({} commands)", path.display(), tree.len()),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} definitions failed", args.definitions.len()).into());
    }
    Ok(())
}

fn run_expand(args: ExpandArgs) -> Result<(), Failure> {
    let handling = if args.line_separated {
        ResponseFileHandling::LineSeparated
    } else {
        ResponseFileHandling::SpaceSeparated
    };
    let working_dir = match args.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| format!("cannot read current directory: {e}"))?,
    };

    let tokens = expand_response_files(&args.args, &working_dir, handling)
        .map_err(|e| e.to_string())?;
    for token in tokens {
        println!("{token}");
    }
    Ok(())
}

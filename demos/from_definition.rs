//! Builds a parser from a YAML definition and prints the parse report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argtree-demos --example from_definition -- svc start -vp 8080 web blue green
//! cargo run -p argtree-demos --example from_definition -- service stop api --force now
//! cargo run -p argtree-demos --example from_definition -- exec box -- ls -la
//! ```

use std::path::Path;

use argtree_core::CommandDefinition;
use argtree_parser::Parser;
use argtree_parser::output::{OutputFormat, format_report};

fn main() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("definitions/deploy.yaml");
    let definition = match CommandDefinition::load(&path) {
        Ok(definition) => definition,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let parser = match Parser::from_definition(&definition) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parser.parse(args) {
        Ok(result) => {
            let port = result.value_of::<u16>("--port");
            match format_report(&result.report(), OutputFormat::Yaml) {
                Ok(text) => print!("{text}"),
                Err(err) => eprintln!("error: {err}"),
            }
            match port {
                Ok(Some(port)) => println!("# port as number: {port}"),
                Ok(None) => {}
                Err(err) => eprintln!("warning: {err}"),
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.hint() {
                eprintln!("\n{hint}");
            }
            std::process::exit(1);
        }
    }
}

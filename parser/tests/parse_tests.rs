use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use argtree_core::{
    ArgumentDefinition, CommandDefinition, CommandId, CommandPolicy, CommandTree, NameComparison,
    OptionArity, OptionDefinition, ResponseFileHandling,
};
use argtree_parser::{
    InformationRequest, ParseError, Parser, Required, UnexpectedKind, ValidationResult,
    expand_response_files,
};

fn opt(template: &str) -> OptionDefinition {
    OptionDefinition::from_template(template).expect("valid template")
}

/// `app` with flags `-a -b -c` and a value-taking `-X`.
fn cluster_parser() -> Parser {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    for template in ["-a", "-b", "-c", "-X <VALUE>"] {
        tree.add_option(root, opt(template)).unwrap();
    }
    Parser::new(tree)
}

/// `app [-v] [-h] serve start --port <PORT>` plus `app known` (lenient).
fn service_tree() -> (CommandTree, CommandId, CommandId, CommandId) {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(root, opt("-v|--verbose").inherited()).unwrap();
    tree.add_option(root, OptionDefinition::help("-h|--help").unwrap().inherited())
        .unwrap();
    let serve = tree.add_command(root, "serve").unwrap();
    tree.add_command(root, "status").unwrap();
    let start = tree.add_command(serve, "start").unwrap();
    tree.add_option(start, opt("-p|--port <PORT>")).unwrap();
    let known = tree.add_command(root, "known").unwrap();
    tree.set_policy(
        known,
        CommandPolicy::default().with_throw_on_unexpected_argument(false),
    )
    .unwrap();
    (tree, serve, start, known)
}

fn service_parser() -> Parser {
    Parser::new(service_tree().0)
}

#[test]
fn test_cluster_forms_bind_identically() {
    let parser = cluster_parser();
    let forms: [&[&str]; 9] = [
        &["-abcXyellow"],
        &["-abcX=yellow"],
        &["-abcX:yellow"],
        &["-abc", "-X=yellow"],
        &["-ab", "-cX=yellow"],
        &["-a", "-b", "-c", "-Xyellow"],
        &["-a", "-b", "-c", "-X", "yellow"],
        &["-a", "-b", "-c", "-X=yellow"],
        &["-a", "-b", "-c", "-X:yellow"],
    ];

    let expected = parser.parse(forms[0].iter().copied()).unwrap().report();
    for form in forms {
        let result = parser.parse(form.iter().copied()).unwrap();
        for flag in ["-a", "-b", "-c"] {
            assert_eq!(result.occurrences(flag), 1, "{flag} in {form:?}");
        }
        assert_eq!(result.option_values("-X"), ["yellow"], "{form:?}");
        assert!(result.remainder().is_empty());
        assert_eq!(result.report(), expected, "{form:?}");
    }
}

#[test]
fn test_failing_cluster_binds_nothing() {
    let parser = cluster_parser();
    let err = parser.parse(["-abz"]).unwrap_err();
    match err {
        ParseError::UnexpectedArgument { token, kind, .. } => {
            assert_eq!(token, "-abz");
            assert_eq!(kind, UnexpectedKind::Option);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_flag_rejects_inline_value() {
    let parser = service_parser();
    let err = parser.parse(["--verbose=yes"]).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedOptionValue { ref option, ref value, .. }
            if option == "--verbose" && value == "yes"
    ));
}

#[test]
fn test_greedy_descent_selects_deepest_command() {
    let parser = service_parser();
    let result = parser.parse(["serve", "start", "--port", "8080"]).unwrap();
    assert_eq!(result.command_path(), ["app", "serve", "start"]);
    assert_eq!(result.option_value("--port"), Some("8080"));
    assert_eq!(result.value_of::<u16>("-p").unwrap(), Some(8080));
    assert_eq!(result.chain().len(), 3);

    // `start` is not a child of the root.
    let err = parser.parse(["start"]).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedArgument { kind: UnexpectedKind::Argument, .. }));
}

#[test]
fn test_missing_option_value() {
    let parser = service_parser();
    let err = parser.parse(["serve", "start", "--port"]).unwrap_err();
    match err {
        ParseError::MissingOptionValue { option, command } => {
            assert_eq!(option, "--port");
            assert_eq!(command, "app serve start");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unexpected_option_throws_by_default() {
    let mut tree = service_tree().0;
    let known = tree.find_child(tree.root(), "known").unwrap();
    tree.set_policy(known, CommandPolicy::default()).unwrap();
    let parser = Parser::new(tree);

    let err = parser.parse(["known", "--unknown-flag", "x"]).unwrap_err();
    match err {
        ParseError::UnexpectedArgument { token, command, kind, .. } => {
            assert_eq!(token, "--unknown-flag");
            assert_eq!(command, "app known");
            assert_eq!(kind, UnexpectedKind::Option);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unexpected_option_goes_to_remainder_when_lenient() {
    let parser = service_parser();
    let result = parser.parse(["known", "--unknown-flag", "x", "-v"]).unwrap();
    assert_eq!(result.command_path(), ["app", "known"]);
    assert_eq!(result.remainder(), ["--unknown-flag", "x", "-v"]);
    // Nothing after the unexpected token is matched.
    assert!(!result.is_present("--verbose"));
}

#[test]
fn test_multiple_argument_absorbs_remaining_positionals() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    let svc = tree.add_command(root, "svc").unwrap();
    tree.add_option(svc, opt("-f|--force")).unwrap();
    tree.add_argument(svc, ArgumentDefinition::new("name")).unwrap();
    tree.add_argument(svc, ArgumentDefinition::multiple("tags")).unwrap();
    let parser = Parser::new(tree);

    let result = parser.parse(["svc", "a", "b", "-f", "c"]).unwrap();
    assert_eq!(result.argument_values("name"), ["a"]);
    assert_eq!(result.argument_values("tags"), ["b", "c"]);
    assert!(result.is_present("-f"));

    let result = parser.parse(["svc", "a"]).unwrap();
    assert!(result.argument_values("tags").is_empty());
}

#[test]
fn test_surplus_positional_is_unexpected() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_argument(root, ArgumentDefinition::new("only")).unwrap();
    let parser = Parser::new(tree);

    let err = parser.parse(["one", "two"]).unwrap_err();
    assert_eq!(err.token(), Some("two"));
}

#[test]
fn test_inheritance_and_shadowing() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(root, opt("-v|--verbose").inherited()).unwrap();
    tree.add_option(root, opt("-q|--quiet")).unwrap();
    let serve = tree.add_command(root, "serve").unwrap();
    tree.add_option(serve, opt("--verbose <LEVEL>")).unwrap();
    let start = tree.add_command(serve, "start").unwrap();
    let parser = Parser::new(tree);

    // The serve-local --verbose is not inherited, so start sees the root one.
    let result = parser.parse(["serve", "start", "-v"]).unwrap();
    assert_eq!(result.find_option("-v").unwrap().command, root);
    assert!(result.is_present("--verbose"));

    // At serve the local option shadows the root option, short form included.
    let result = parser.parse(["serve", "--verbose", "3"]).unwrap();
    assert_eq!(result.find_option("--verbose").unwrap().command, serve);
    assert_eq!(result.option_value("--verbose"), Some("3"));
    assert!(parser.parse(["serve", "-v"]).is_err());

    // Non-inherited options bind before descent but are invisible after it.
    let result = parser.parse(["-q", "serve", "start"]).unwrap();
    assert!(result.is_present("--quiet"));
    assert_eq!(result.command(), start);
    assert!(parser.parse(["serve", "-q"]).is_err());
}

#[test]
fn test_shadowed_option_falls_back_to_earlier_binding() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(root, opt("-v|--verbose").inherited()).unwrap();
    let serve = tree.add_command(root, "serve").unwrap();
    tree.add_option(serve, opt("--verbose <LEVEL>")).unwrap();
    let parser = Parser::new(tree);

    // Matched at the root, before the local option shadowed it.
    let result = parser.parse(["-v", "serve"]).unwrap();
    assert_eq!(result.find_option("--verbose").unwrap().command, serve);
    assert!(result.is_present("--verbose"));
    assert_eq!(result.occurrences("--verbose"), 1);

    // A local binding wins over the shadowed one.
    let result = parser.parse(["-v", "serve", "--verbose", "3"]).unwrap();
    assert_eq!(result.option_values("--verbose"), ["3"]);
    assert_eq!(result.occurrences("--verbose"), 1);
}

#[test]
fn test_separator_moves_rest_to_remainder() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    let run = tree.add_command(root, "run").unwrap();
    tree.set_policy(
        run,
        CommandPolicy::default()
            .with_allow_argument_separator(true)
            .with_response_file_handling(ResponseFileHandling::SpaceSeparated),
    )
    .unwrap();
    tree.add_argument(run, ArgumentDefinition::new("script")).unwrap();
    let parser = Parser::new(tree).with_working_directory("/nonexistent/argtree");

    let result = parser
        .parse(["run", "script.sh", "--", "--flag", "@never-read.rsp", "--"])
        .unwrap();
    assert_eq!(result.argument_value("script"), Some("script.sh"));
    assert_eq!(result.remainder(), ["--flag", "@never-read.rsp", "--"]);

    let err = parser.parse(["--", "x"]).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedArgument { kind: UnexpectedKind::Separator, .. }
    ));
}

#[test]
fn test_response_file_expansion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("args.rsp"),
        "-v --port 80\n\"hello world\"",
    )
    .unwrap();

    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.set_policy(
        root,
        CommandPolicy::default().with_response_file_handling(ResponseFileHandling::SpaceSeparated),
    )
    .unwrap();
    tree.add_option(root, opt("-v|--verbose").inherited()).unwrap();
    let serve = tree.add_command(root, "serve").unwrap();
    tree.add_option(serve, opt("--port <PORT>")).unwrap();
    tree.add_argument(serve, ArgumentDefinition::multiple("words")).unwrap();
    let parser = Parser::new(tree).with_working_directory(dir.path());

    let args = ["serve", "@args.rsp", "tail"];
    let direct = parser.parse(args).unwrap();
    assert!(direct.is_present("-v"));
    assert_eq!(direct.option_value("--port"), Some("80"));
    assert_eq!(direct.argument_values("words"), ["hello world", "tail"]);

    let expanded =
        expand_response_files(args, dir.path(), ResponseFileHandling::SpaceSeparated).unwrap();
    let reparsed = parser.parse(expanded).unwrap();
    assert_eq!(direct.report(), reparsed.report());
}

#[test]
fn test_response_files_follow_current_command_policy() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list.txt"), "alpha beta\n\ngamma\n@list.txt\n").unwrap();

    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_argument(root, ArgumentDefinition::new("first")).unwrap();
    let run = tree.add_command(root, "run").unwrap();
    tree.set_policy(
        run,
        CommandPolicy::default().with_response_file_handling(ResponseFileHandling::LineSeparated),
    )
    .unwrap();
    tree.add_argument(run, ArgumentDefinition::multiple("items")).unwrap();
    let parser = Parser::new(tree).with_working_directory(dir.path());

    let result = parser.parse(["@list.txt", "run", "@list.txt"]).unwrap();
    assert_eq!(result.argument_values("first"), ["@list.txt"]);
    // Tokens read from a response file are never expanded again.
    assert_eq!(
        result.argument_values("items"),
        ["alpha beta", "gamma", "@list.txt"]
    );

    let err = parser.parse(["run", "@missing.txt"]).unwrap_err();
    assert!(matches!(err, ParseError::ResponseFile { .. }));
}

#[test]
fn test_ignore_case_names() {
    let (mut tree, ..) = service_tree();
    let root = tree.root();
    tree.set_policy(
        root,
        CommandPolicy::default().with_name_comparison(NameComparison::IgnoreCase),
    )
    .unwrap();
    let parser = Parser::new(tree);

    let result = parser.parse(["SERVE", "Start", "--PORT", "1", "-V"]).unwrap();
    assert_eq!(result.command_path(), ["app", "serve", "start"]);
    assert_eq!(result.option_value("--port"), Some("1"));
    assert!(result.is_present("--verbose"));
}

#[test]
fn test_optional_single_value() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(
        root,
        opt("--color <WHEN>").with_arity(OptionArity::OptionalSingle),
    )
    .unwrap();
    tree.add_argument(root, ArgumentDefinition::new("file")).unwrap();
    let parser = Parser::new(tree);

    let result = parser.parse(["--color", "out.txt"]).unwrap();
    assert!(result.is_present("--color"));
    assert_eq!(result.option_value("--color"), None);
    assert_eq!(result.argument_value("file"), Some("out.txt"));

    let result = parser.parse(["--color=always"]).unwrap();
    assert_eq!(result.option_value("--color"), Some("always"));

    let result = parser.parse(["--color="]).unwrap();
    assert_eq!(result.option_value("--color"), Some(""));
}

#[test]
fn test_repeated_values_accumulate() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(root, opt("-I <DIR>").with_arity(OptionArity::Multiple))
        .unwrap();
    let parser = Parser::new(tree);

    let result = parser.parse(["-I", "a", "-Ib", "-I=c"]).unwrap();
    assert_eq!(result.option_values("-I"), ["a", "b", "c"]);
    assert_eq!(result.occurrences("-I"), 3);
}

#[test]
fn test_help_stops_parsing_and_skips_validation() {
    let (tree, serve, start, _) = service_tree();
    let mut parser = Parser::new(tree);
    parser.add_validator(start, Required::option("--port"));

    let result = parser.parse(["serve", "start", "-h", "--bogus", "x"]).unwrap();
    assert_eq!(result.information(), Some(InformationRequest::Help));
    assert_eq!(result.remainder(), ["--bogus", "x"]);
    assert!(result.validation().is_success());
    assert_eq!(result.command(), start);

    let result = parser.parse(["serve", "start"]).unwrap();
    assert!(!result.validation().is_success());
    assert_ne!(result.command(), serve);
}

#[test]
fn test_validation_stops_at_first_failure() {
    let mut tree = CommandTree::new("app");
    let root = tree.root();
    tree.add_option(root, opt("--name <NAME>")).unwrap();
    let child = tree.add_command(root, "child").unwrap();
    let mut parser = Parser::new(tree);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    parser.add_validator(root, Required::option("--name"));
    parser.add_validator_fn(root, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        ValidationResult::Success
    });

    let result = parser.parse(Vec::<String>::new()).unwrap();
    let failure = result.validation().failure_ref().unwrap();
    assert_eq!(failure.member.as_deref(), Some("--name"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let result = parser.parse(["--name", "x"]).unwrap();
    assert!(result.validation().is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Only the selected command's validators run.
    let result = parser.parse(["child"]).unwrap();
    assert_eq!(result.command(), child);
    assert!(result.validation().is_success());

    let err = parser.parse_and_validate(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, ParseError::ValidationFailure(_)));
}

#[test]
fn test_suggestions_for_misspelled_command() {
    let parser = service_parser();
    let err = parser.parse(["serv"]).unwrap_err();
    match &err {
        ParseError::UnexpectedArgument { suggestions, .. } => assert_eq!(suggestions, &["serve"]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.hint().unwrap(), "Did you mean this?\n    serve");

    let (mut tree, ..) = service_tree();
    let root = tree.root();
    tree.set_policy(root, CommandPolicy::default().with_make_suggestions(false))
        .unwrap();
    let parser = Parser::new(tree);
    let err = parser.parse(["serv"]).unwrap_err();
    assert_eq!(err.hint(), None);
}

#[test]
fn test_parser_from_definition_registers_hints() {
    let definition = CommandDefinition::from_yaml_str(
        r#"
name: app
options:
  - template: "--mode <MODE>"
    inherited: true
    allowed_values: [fast, safe]
    ignore_case: true
commands:
  - name: deploy
    options:
      - template: "-t|--target <TARGET>"
        required: true
        single: true
    arguments:
      - name: service
        required: true
"#,
    )
    .unwrap();
    let parser = Parser::from_definition(&definition).unwrap();

    let result = parser
        .parse(["deploy", "-t", "prod", "web", "--mode", "FAST"])
        .unwrap();
    assert!(result.validation().is_success(), "{:?}", result.validation());

    let result = parser.parse(["deploy", "web"]).unwrap();
    assert_eq!(
        result.validation().failure_ref().unwrap().member.as_deref(),
        Some("--target")
    );

    let result = parser.parse(["deploy", "-t", "a", "-t", "b", "web"]).unwrap();
    assert!(!result.validation().is_success());

    let result = parser.parse(["deploy", "-t", "a", "web", "--mode", "slow"]).unwrap();
    assert!(!result.validation().is_success());

    let result = parser.parse(["deploy", "-t", "a"]).unwrap();
    assert_eq!(
        result.validation().failure_ref().unwrap().member.as_deref(),
        Some("service")
    );
}

#[test]
fn test_definition_hints_skip_shadowing_commands() {
    let definition = CommandDefinition::from_yaml_str(
        r#"
name: app
options:
  - template: "--env <ENV>"
    inherited: true
    allowed_values: [dev, prod]
commands:
  - name: deploy
    options:
      - template: "--env <TEXT>"
  - name: status
"#,
    )
    .unwrap();
    let parser = Parser::from_definition(&definition).unwrap();

    let result = parser.parse(["deploy", "--env", "staging"]).unwrap();
    assert!(result.validation().is_success(), "{:?}", result.validation());

    // Commands that still see the inherited option keep its constraints.
    let result = parser.parse(["status", "--env", "staging"]).unwrap();
    assert_eq!(
        result.validation().failure_ref().unwrap().member.as_deref(),
        Some("--env")
    );
    let result = parser.parse(["--env", "staging"]).unwrap();
    assert!(!result.validation().is_success());
}

#[test]
fn test_concurrent_parses_share_one_parser() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Parser>();

    let parser = service_parser();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8u16)
            .map(|i| {
                let parser = &parser;
                s.spawn(move || {
                    let port = (8000 + i).to_string();
                    let result = parser
                        .parse(["serve", "start", "--port", port.as_str()])
                        .unwrap();
                    result.value_of::<u16>("--port").unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(8000 + i as u16));
        }
    });
}

#[test]
fn test_report_lists_bindings_by_display_name() {
    let parser = service_parser();
    let report = parser
        .parse(["-v", "serve", "start", "-p", "9", "-v"])
        .unwrap()
        .report();
    assert_eq!(report.command_path, ["app", "serve", "start"]);
    let verbose = report.options.iter().find(|o| o.name == "--verbose").unwrap();
    assert_eq!(verbose.occurrences, 2);
    assert_eq!(verbose.command, "app");
    let port = report.options.iter().find(|o| o.name == "--port").unwrap();
    assert_eq!(port.values, ["9"]);
    assert!(report.is_valid());
}

#[test]
fn test_demo_definition_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/definitions/deploy.yaml");
    let definition = CommandDefinition::load(&path).unwrap();
    let parser = Parser::from_definition(&definition).unwrap();

    let result = parser
        .parse(["SVC", "start", "-vp", "8080", "web", "--env", "PROD", "blue"])
        .unwrap();
    assert_eq!(result.command_path(), ["deploy", "service", "start"]);
    assert!(result.validation().is_success(), "{:?}", result.validation());
    assert_eq!(result.argument_values("tags"), ["blue"]);

    let result = parser.parse(["service", "stop", "api", "--force", "now"]).unwrap();
    assert_eq!(result.remainder(), ["--force", "now"]);
    assert!(result.validation().is_success());
}

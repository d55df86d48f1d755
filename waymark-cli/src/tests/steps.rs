//! Behaviour-driven step definitions driving the import CLI scenarios.

use super::helpers::{DANGLING_DOCUMENT, SMALL_DOCUMENT, Workspace};
use super::*;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct ImportWorld {
    workspace: Workspace,
    input: RefCell<Option<Utf8PathBuf>>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl ImportWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            input: RefCell::new(None),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["waymark".to_owned(), "import".to_owned()];
        if let Some(input) = self.input.borrow().as_ref() {
            argv.push(input.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn stdout(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    fn assert_succeeded(&self) {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err}");
        }
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            match result.as_ref().expect("result recorded") {
                Ok(()) => panic!("expected the command to fail"),
                Err(err) => err,
            }
        })
    }
}

#[fixture]
fn world() -> ImportWorld {
    ImportWorld::new()
}

#[given("an OSM document exists on disk")]
fn document_exists(#[from(world)] world: &ImportWorld) {
    let path = world.workspace.write("small.osm", SMALL_DOCUMENT);
    world.input.replace(Some(path));
}

#[given("an OSM document with a dangling new node reference")]
fn dangling_document_exists(#[from(world)] world: &ImportWorld) {
    let path = world.workspace.write("dangling.osm", DANGLING_DOCUMENT);
    world.input.replace(Some(path));
}

#[given("I request pretty output")]
fn request_pretty_output(#[from(world)] world: &ImportWorld) {
    world.cli_args.borrow_mut().push(format!("--{ARG_PRETTY}"));
}

#[given("I omit the input path")]
fn omit_input_path(#[from(world)] world: &ImportWorld) {
    world.input.replace(None);
}

#[when("I run the import command")]
fn run_import_command(#[from(world)] world: &ImportWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Import(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_import_with(args, &mut *buffer)
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints a compact summary")]
fn prints_compact_summary(#[from(world)] world: &ImportWorld) {
    world.assert_succeeded();
    let stdout = world.stdout();
    assert_eq!(stdout.lines().count(), 1, "unexpected output {stdout}");
    let summary: ImportSummary = serde_json::from_str(&stdout).expect("summary JSON");
    assert_eq!(summary.version.as_deref(), Some("0.6"));
}

#[then("the summary counts one incomplete placeholder")]
fn counts_incomplete_placeholder(#[from(world)] world: &ImportWorld) {
    let summary: ImportSummary = serde_json::from_str(&world.stdout()).expect("summary JSON");
    assert_eq!(summary.incomplete, 1);
    assert_eq!(summary.points, 2);
}

#[then("the command succeeds and prints an indented summary")]
fn prints_indented_summary(#[from(world)] world: &ImportWorld) {
    world.assert_succeeded();
    let stdout = world.stdout();
    assert!(stdout.lines().count() > 1, "expected indented output");
    assert!(stdout.contains("\n  \"points\": 2"));
}

#[then("the command fails because the input path is missing")]
fn fails_on_missing_path(#[from(world)] world: &ImportWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_IMPORT_PATH),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails naming the document")]
fn fails_naming_document(#[from(world)] world: &ImportWorld) {
    let expected = world.input.borrow().clone().expect("input recorded");
    match &*world.error() {
        CliError::Import { path, source } => {
            assert_eq!(*path, expected);
            assert!(source.to_string().contains("way -2"));
        }
        other => panic!("expected Import, found {other:?}"),
    }
}

macro_rules! register_import_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/import_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ImportWorld) {
            let _ = world;
        }
    };
}

register_import_scenario!(import_summary, "summarising an imported document");
register_import_scenario!(import_pretty, "requesting an indented summary");
register_import_scenario!(import_missing_path, "rejecting a missing input path");
register_import_scenario!(import_dangling_reference, "reporting an unresolvable reference");

//! Behavioural tests for the `import_osm_file` entry point.

use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempPath;
use waymark_core::{PrimitiveId, PrimitiveKind, UserKey};
use waymark_data::{
    DiagnosticKind, ImportError, ImportErrorKind, ImportOptions, ImportReport, import_osm_file,
};

mod support;

use support::{Encoding, stage_fixture};

#[fixture]
fn fixtures_dir() -> PathBuf {
    support::fixtures_dir()
}

enum FixtureTarget {
    Existing(TempPath),
    Missing(Utf8PathBuf),
}

impl FixtureTarget {
    fn path(&self) -> &Utf8Path {
        match self {
            FixtureTarget::Existing(temp) => {
                Utf8Path::from_path(temp.as_ref()).expect("temporary paths are UTF-8")
            }
            FixtureTarget::Missing(path) => path.as_path(),
        }
    }
}

#[fixture]
fn target_fixture() -> RefCell<Option<FixtureTarget>> {
    RefCell::new(None)
}

#[fixture]
fn import_result() -> RefCell<Option<Result<ImportReport, ImportError>>> {
    RefCell::new(None)
}

fn stage(
    dir: &Path,
    target: &RefCell<Option<FixtureTarget>>,
    result: &RefCell<Option<Result<ImportReport, ImportError>>>,
    stem: &str,
    encoding: Encoding,
) {
    let fixture = stage_fixture(dir, stem, encoding);
    *target.borrow_mut() = Some(FixtureTarget::Existing(fixture));
    *result.borrow_mut() = None;
}

fn with_report<T>(
    result: &RefCell<Option<Result<ImportReport, ImportError>>>,
    inspect: impl FnOnce(&ImportReport) -> T,
) -> T {
    let borrowed = result.borrow();
    match borrowed.as_ref().expect("import was attempted") {
        Ok(report) => inspect(report),
        Err(err) => panic!("expected a successful import: {err}"),
    }
}

#[given("the partial download fixture")]
fn partial_download(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "partial_download", Encoding::Plain);
}

#[given("the partial download fixture compressed with bzip2")]
fn compressed_partial_download(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "partial_download", Encoding::Bzip2);
}

#[given("the partial download fixture split across two bzip2 streams")]
fn multistream_partial_download(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "partial_download", Encoding::Bzip2Multistream);
}

#[given("the mutual relations fixture")]
fn mutual_relations(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "mutual_relations", Encoding::Plain);
}

#[given("the missing new node fixture")]
fn missing_new_node(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "missing_new_node", Encoding::Plain);
}

#[given("the legacy fixture")]
fn legacy(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    stage(&dir, target, result, "legacy", Encoding::Plain);
}

#[given("a path to a missing file")]
fn missing_file(
    #[from(fixtures_dir)] dir: PathBuf,
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let missing = Utf8PathBuf::from_path_buf(dir.join("missing.osm"))
        .unwrap_or_else(|path| panic!("fixture path {path:?} is not UTF-8"));
    *target.borrow_mut() = Some(FixtureTarget::Missing(missing));
    *result.borrow_mut() = None;
}

#[when("I import the file")]
fn import_selected(
    #[from(target_fixture)] target: &RefCell<Option<FixtureTarget>>,
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let outcome = {
        let guard = target.borrow();
        let borrowed = guard.as_ref().expect("target path prepared");
        import_osm_file(borrowed.path(), ImportOptions::default())
    };
    *result.borrow_mut() = Some(outcome);
}

#[then("way 2 lists node 1 followed by node 3")]
fn way_nodes(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        let ids: Vec<i64> = report.dataset.path_nodes(2).map(|node| node.id()).collect();
        assert_eq!(ids, vec![1, 3]);
    });
}

#[then("node 1 is fully populated")]
fn node_one_complete(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        let node = report
            .dataset
            .get(PrimitiveId::point(1))
            .expect("node 1 should be present");
        assert!(!node.is_incomplete());
        assert_eq!(node.version, 3);
        assert_eq!(node.changeset, 1024);
        assert!(node.timestamp.is_some());
        assert_eq!(node.author, Some(UserKey::Osm(77)));
        assert_eq!(node.tags.get("name").map(String::as_str), Some("Clock Tower"));
        assert!(node.coord().is_some());
    });
}

#[then("node 3 is an incomplete placeholder")]
fn node_three_incomplete(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        let node = report
            .dataset
            .get(PrimitiveId::point(3))
            .expect("node 3 should be materialised");
        assert!(node.is_incomplete());
        assert_eq!(node.version, 0);
        assert!(node.tags.is_empty());
        assert!(node.coord().is_none());
        assert_eq!(report.dataset.incomplete_count(), 1);
    });
}

#[then("each relation lists the other as a member")]
fn mutual_members(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        let first: Vec<(String, PrimitiveId)> = report
            .dataset
            .relation_members(-10)
            .map(|(role, member)| (role.to_owned(), member.key()))
            .collect();
        assert_eq!(
            first,
            vec![
                ("subarea".to_owned(), PrimitiveId::relation(-11)),
                ("admin_centre".to_owned(), PrimitiveId::point(-1)),
            ]
        );
        let second: Vec<(String, PrimitiveId)> = report
            .dataset
            .relation_members(-11)
            .map(|(role, member)| (role.to_owned(), member.key()))
            .collect();
        assert_eq!(second, vec![("parent".to_owned(), PrimitiveId::relation(-10))]);
        assert_eq!(report.dataset.count_of(PrimitiveKind::Relation), 2);
    });
}

#[then("the import fails naming way -2 and node -3")]
fn missing_node_error(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let borrowed = result.borrow();
    let outcome = borrowed.as_ref().expect("import was attempted");
    match outcome {
        Ok(_) => panic!("expected the import to fail"),
        Err(err) => match err.kind() {
            ImportErrorKind::MissingNode { path, node } => {
                assert_eq!((*path, *node), (-2, -3));
                assert!(err.to_string().contains("way -2"), "{err}");
            }
            other => panic!("expected a missing node error, got {other:?}"),
        },
    }
}

#[then("every existing primitive has a positive version")]
fn positive_versions(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        assert_eq!(report.dataset.version(), Some("0.5"));
        for primitive in report.dataset.primitives() {
            assert!(primitive.version > 0, "{:?} has version 0", primitive.key());
        }
        let way = report.dataset.get(PrimitiveId::path(7)).expect("way 7");
        assert_eq!(way.version, 2);
        let guest = report.dataset.get(PrimitiveId::point(5)).expect("node 5");
        assert_eq!(guest.author, Some(UserKey::Local("guest".to_owned())));
    });
}

#[then("two version diagnostics are reported")]
fn version_diagnostics(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    with_report(result, |report| {
        assert_eq!(
            report
                .diagnostics_of(DiagnosticKind::VersionNormalised)
                .count(),
            2
        );
        assert_eq!(report.diagnostics.len(), 2);
    });
}

#[then("an open error is returned")]
fn open_error(
    #[from(import_result)] result: &RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let borrowed = result.borrow();
    let outcome = borrowed.as_ref().expect("import was attempted");
    match outcome {
        Ok(_) => panic!("expected an error for the missing file"),
        Err(err) => match err.kind() {
            ImportErrorKind::Open { path, .. } => {
                assert!(
                    path.as_str().ends_with("missing.osm"),
                    "unexpected path in error: {path}"
                );
            }
            other => panic!("expected an open error, got {other:?}"),
        },
    }
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/import_osm_file.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<String> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .map(|title| title.to_owned())
        .collect();
    let expected = [
        "resolving a partial download",
        "resolving mutually referencing relations",
        "rejecting a reference to a missing new node",
        "reading a bzip2-compressed document",
        "normalising versions in a legacy document",
        "reporting a missing file",
        "reading a multistream bzip2 document",
    ];
    assert_eq!(
        titles, expected,
        "scenario order changed in feature file: {titles:?}"
    );
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 0)]
fn resolving_partial_downloads(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 1)]
fn resolving_mutual_relations(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 2)]
fn rejecting_missing_new_nodes(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 3)]
fn reading_compressed_documents(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 4)]
fn normalising_legacy_versions(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 5)]
fn reporting_missing_files(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

#[scenario(path = "tests/features/import_osm_file.feature", index = 6)]
fn reading_multistream_documents(
    fixtures_dir: PathBuf,
    target_fixture: RefCell<Option<FixtureTarget>>,
    import_result: RefCell<Option<Result<ImportReport, ImportError>>>,
) {
    let _ = (fixtures_dir, target_fixture, import_result);
}

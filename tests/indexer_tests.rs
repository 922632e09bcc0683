//! End-to-end indexing passes over a fake parser
//!
//! Covers the driver, the visitor, and the freshness logic: fresh
//! indexing, no-op reruns, header edits, vanished files, exclusion, and
//! failure semantics of the single-pass transaction.

mod common;

use std::fs;
use std::thread::sleep;
use std::time::Duration;

use common::{decl, mtime_secs, refr, FakeParser, FakeUnit};
use crosstag::{indexer, IndexOptions, Storage};
use tempfile::TempDir;

/// A scratch project: one translation unit including one header
struct Project {
    _tmp: TempDir,
    db: std::path::PathBuf,
    a_cpp: String,
    a_h: String,
}

fn project() -> Project {
    let tmp = TempDir::new().unwrap();
    let a_cpp = tmp.path().join("a.cpp");
    let a_h = tmp.path().join("a.h");
    fs::write(&a_cpp, "#include \"a.h\"\nint main() { return helper(); }\n").unwrap();
    fs::write(&a_h, "int helper();\n").unwrap();

    let db = tmp.path().join("index.sqlite");
    Project {
        a_cpp: a_cpp.to_string_lossy().into_owned(),
        a_h: a_h.to_string_lossy().into_owned(),
        db,
        _tmp: tmp,
    }
}

/// Cursor tree for the project's single translation unit
fn project_cursors(project: &Project) -> Vec<common::FakeCursor> {
    vec![
        decl(
            "c:@F@helper",
            "FunctionDecl",
            "helper",
            &project.a_h,
            (1, 5, 4),
            (1, 13, 12),
        ),
        decl(
            "c:@F@main",
            "FunctionDecl",
            "main",
            &project.a_cpp,
            (2, 5, 20),
            (2, 45, 60),
        ),
        refr(
            "c:@F@helper",
            "DeclRefExpr",
            "helper",
            &project.a_cpp,
            (2, 31, 46),
            (2, 37, 52),
        ),
    ]
}

fn project_unit(project: &Project) -> FakeUnit {
    FakeUnit::new(project_cursors(project))
}

fn compile_args(file: &str) -> Vec<String> {
    vec!["clang++".to_string(), file.to_string()]
}

fn full_index(project: &Project, parser: &FakeParser) -> Storage {
    let storage = Storage::open(&project.db).unwrap();
    storage
        .set_compile_command(&project.a_cpp, "/", &compile_args(&project.a_cpp))
        .unwrap();

    let options = IndexOptions::default();
    let mut out = Vec::new();
    indexer::index(&storage, parser, &options, &mut out).unwrap();
    storage
}

#[test]
fn fresh_index_registers_files_edges_and_tags() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = full_index(&project, &parser);

    assert_eq!(storage.count_files().unwrap(), 2);
    assert_eq!(
        storage.last_indexed(&project.a_cpp).unwrap(),
        Some(mtime_secs(&project.a_cpp))
    );
    assert_eq!(
        storage.last_indexed(&project.a_h).unwrap(),
        Some(mtime_secs(&project.a_h))
    );

    let edges = storage.include_edges().unwrap();
    assert!(edges.contains(&(project.a_cpp.clone(), project.a_cpp.clone())));
    assert!(edges.contains(&(project.a_cpp.clone(), project.a_h.clone())));
    assert_eq!(edges.len(), 2);

    assert!(storage.count_tags_in(&project.a_cpp).unwrap() > 0);
    assert!(storage.count_tags_in(&project.a_h).unwrap() > 0);
}

#[test]
fn rerun_without_changes_parses_nothing() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = full_index(&project, &parser);
    let tags_before = storage.count_tags().unwrap();
    parser.clear_parsed();

    assert_eq!(storage.next_file().unwrap(), None);

    let mut out = Vec::new();
    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    assert!(parser.parsed().is_empty());
    assert_eq!(storage.count_tags().unwrap(), tags_before);
}

#[test]
fn two_passes_produce_identical_contents() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = full_index(&project, &parser);

    let snapshot = |storage: &Storage| {
        (
            storage.count_files().unwrap(),
            storage.count_tags().unwrap(),
            storage.include_edges().unwrap(),
            storage.last_indexed(&project.a_cpp).unwrap(),
            storage.last_indexed(&project.a_h).unwrap(),
        )
    };
    let before = snapshot(&storage);

    let mut out = Vec::new();
    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();
    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    assert_eq!(snapshot(&storage), before);
}

#[test]
fn edited_header_is_reparsed_through_its_source() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = full_index(&project, &parser);
    let a_cpp_indexed = storage.last_indexed(&project.a_cpp).unwrap();

    // mtime granularity is one second
    sleep(Duration::from_millis(1100));
    fs::write(&project.a_h, "int helper();\nint helper2();\n").unwrap();

    // The reparse sees the header's new contents
    parser.set_unit(
        &project.a_cpp,
        FakeUnit::new(vec![
            decl(
                "c:@F@helper",
                "FunctionDecl",
                "helper",
                &project.a_h,
                (1, 5, 4),
                (1, 13, 12),
            ),
            decl(
                "c:@F@helper2",
                "FunctionDecl",
                "helper2",
                &project.a_h,
                (2, 5, 18),
                (2, 14, 27),
            ),
        ]),
    );
    parser.clear_parsed();

    let mut out = Vec::new();
    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    assert_eq!(parser.parsed(), vec![project.a_cpp.clone()]);
    assert_eq!(
        storage.last_indexed(&project.a_h).unwrap(),
        Some(mtime_secs(&project.a_h))
    );
    // The source itself did not change, so its timestamp and tags stay
    assert_eq!(storage.last_indexed(&project.a_cpp).unwrap(), a_cpp_indexed);

    // Header tags were replaced, not accumulated
    assert_eq!(storage.count_tags_in(&project.a_h).unwrap(), 2);
    let refs = storage.grep("c:@F@helper2").unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].offset1, 18);
}

#[test]
fn vanished_header_is_dropped_from_the_index() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = full_index(&project, &parser);
    fs::remove_file(&project.a_h).unwrap();
    parser.clear_parsed();

    let mut out = Vec::new();
    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    assert!(parser.parsed().is_empty());
    assert_eq!(storage.file_names().unwrap(), vec![project.a_cpp.clone()]);
    assert_eq!(storage.count_tags_in(&project.a_h).unwrap(), 0);
    assert_eq!(
        storage.include_edges().unwrap(),
        vec![(project.a_cpp.clone(), project.a_cpp.clone())]
    );
}

#[test]
fn excluded_paths_produce_no_files_and_no_tags() {
    let project = project();
    let parser = FakeParser::new();

    let system_header = "/usr/include/stdio.h";
    let mut cursors = project_cursors(&project);
    cursors.push(decl(
        "c:@F@printf",
        "FunctionDecl",
        "printf",
        system_header,
        (100, 5, 2000),
        (100, 40, 2035),
    ));
    parser.set_unit(&project.a_cpp, FakeUnit::new(cursors));

    let storage = Storage::open(&project.db).unwrap();
    storage
        .set_compile_command(&project.a_cpp, "/", &compile_args(&project.a_cpp))
        .unwrap();

    let options = IndexOptions {
        exclude: vec!["/usr/include/".to_string()],
        ..IndexOptions::default()
    };
    let mut out = Vec::new();
    indexer::index(&storage, &parser, &options, &mut out).unwrap();

    assert!(!storage
        .file_names()
        .unwrap()
        .iter()
        .any(|name| name.starts_with("/usr/include/")));
    assert_eq!(storage.grep("c:@F@printf").unwrap().len(), 0);

    // The exclude list is persisted for later update passes
    assert_eq!(
        storage.get_option_list("exclude").unwrap(),
        vec!["/usr/include/".to_string()]
    );
}

#[test]
fn shared_header_edit_reparses_one_including_source() {
    let tmp = TempDir::new().unwrap();
    let s1 = tmp.path().join("s1.cpp");
    let s2 = tmp.path().join("s2.cpp");
    let shared = tmp.path().join("shared.h");
    fs::write(&s1, "#include \"shared.h\"\n").unwrap();
    fs::write(&s2, "#include \"shared.h\"\n").unwrap();
    fs::write(&shared, "int shared();\n").unwrap();
    let s1 = s1.to_string_lossy().into_owned();
    let s2 = s2.to_string_lossy().into_owned();
    let shared = shared.to_string_lossy().into_owned();

    let unit_for = |own: &str, own_usr: &str| {
        FakeUnit::new(vec![
            decl(
                "c:@F@shared",
                "FunctionDecl",
                "shared",
                &shared,
                (1, 5, 4),
                (1, 12, 11),
            ),
            decl(own_usr, "FunctionDecl", "f", own, (1, 1, 0), (1, 2, 1)),
        ])
    };

    let parser = FakeParser::new();
    parser.set_unit(&s1, unit_for(&s1, "c:@F@f1"));
    parser.set_unit(&s2, unit_for(&s2, "c:@F@f2"));

    let storage = Storage::open(tmp.path().join("index.sqlite")).unwrap();
    storage
        .set_compile_command(&s1, "/", &compile_args(&s1))
        .unwrap();
    storage
        .set_compile_command(&s2, "/", &compile_args(&s2))
        .unwrap();

    let mut out = Vec::new();
    indexer::index(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    // Both translation units were parsed, the header only stored once
    let mut parsed = parser.parsed();
    parsed.sort();
    let mut expected = vec![s1.clone(), s2.clone()];
    expected.sort();
    assert_eq!(parsed, expected);
    assert_eq!(storage.count_tags_in(&shared).unwrap(), 1);

    sleep(Duration::from_millis(1100));
    fs::write(&shared, "int shared();\nint more();\n").unwrap();
    parser.clear_parsed();

    indexer::update(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    // One source refreshes the header; afterwards nothing is stale
    assert_eq!(parser.parsed().len(), 1);
    assert_eq!(
        storage.last_indexed(&shared).unwrap(),
        Some(mtime_secs(&shared))
    );
    assert_eq!(storage.next_file().unwrap(), None);
}

#[test]
fn parse_failure_in_explicit_list_skips_the_file() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(&project.a_cpp, project_unit(&project));

    let storage = Storage::open(&project.db).unwrap();
    storage
        .set_compile_command(&project.a_cpp, "/", &compile_args(&project.a_cpp))
        .unwrap();

    let options = IndexOptions {
        file_names: vec!["/no/such/file.cpp".to_string(), project.a_cpp.clone()],
        ..IndexOptions::default()
    };
    let mut out = Vec::new();
    indexer::index(&storage, &parser, &options, &mut out).unwrap();

    // The broken file was reported and skipped; the good one indexed
    assert!(storage.count_tags_in(&project.a_cpp).unwrap() > 0);
}

#[test]
fn parse_failure_in_scheduled_pass_rolls_back_everything() {
    let tmp = TempDir::new().unwrap();
    let s1 = tmp.path().join("s1.cpp");
    let s2 = tmp.path().join("s2.cpp");
    fs::write(&s1, "int f1() { return 1; }\n").unwrap();
    fs::write(&s2, "int f2() { return 2; }\n").unwrap();
    let s1 = s1.to_string_lossy().into_owned();
    let s2 = s2.to_string_lossy().into_owned();

    let parser = FakeParser::new();
    parser.set_unit(
        &s1,
        FakeUnit::new(vec![decl(
            "c:@F@f1",
            "FunctionDecl",
            "f1",
            &s1,
            (1, 5, 4),
            (1, 7, 6),
        )]),
    );
    parser.set_unit(
        &s2,
        FakeUnit::new(vec![decl(
            "c:@F@f2",
            "FunctionDecl",
            "f2",
            &s2,
            (1, 5, 4),
            (1, 7, 6),
        )]),
    );

    let storage = Storage::open(tmp.path().join("index.sqlite")).unwrap();
    storage
        .set_compile_command(&s1, "/", &compile_args(&s1))
        .unwrap();
    storage
        .set_compile_command(&s2, "/", &compile_args(&s2))
        .unwrap();

    let mut out = Vec::new();
    indexer::index(&storage, &parser, &IndexOptions::default(), &mut out).unwrap();

    // Make both sources stale, then break one of them
    sleep(Duration::from_millis(1100));
    fs::write(&s1, "int f1() { return 10; }\n").unwrap();
    fs::write(&s2, "int f2() { return 20; }\n").unwrap();
    parser.remove_unit(&s2);
    let s1_indexed = storage.last_indexed(&s1).unwrap();

    let result = indexer::update(&storage, &parser, &IndexOptions::default(), &mut out);
    assert!(result.is_err());

    // The whole pass rolled back, including any completed reparse
    assert_eq!(storage.last_indexed(&s1).unwrap(), s1_indexed);
}

#[test]
fn diagnostics_are_printed_when_requested() {
    let project = project();
    let parser = FakeParser::new();
    parser.set_unit(
        &project.a_cpp,
        project_unit(&project).with_diagnostics(vec!["warning: unused variable 'x'".to_string()]),
    );

    let storage = Storage::open(&project.db).unwrap();
    storage
        .set_compile_command(&project.a_cpp, "/", &compile_args(&project.a_cpp))
        .unwrap();

    let options = IndexOptions {
        diagnostics: true,
        ..IndexOptions::default()
    };
    let mut out = Vec::new();
    indexer::index(&storage, &parser, &options, &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("warning: unused variable 'x'"));
    assert!(printed.contains("parsing..."));
    assert!(printed.contains("indexing..."));
}

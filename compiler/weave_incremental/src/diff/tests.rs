#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use weave_fingerprint::Fingerprinter;
use weave_ir::{FilePath, ProjectId, TypeName};

use super::*;
use crate::version::{Compilation, SourceText, VersionBuilder};

fn build(
    previous: Option<&Arc<ProjectVersion>>,
    name: &str,
    files: &[(&str, &str)],
    refs: &[Arc<ProjectVersion>],
) -> Arc<ProjectVersion> {
    let engine = Fingerprinter::new();
    let compilation = Compilation::new(
        ProjectId::named(name),
        files.iter().map(|(p, t)| SourceText::new(*p, *t)).collect(),
        refs.iter().map(|r| r.id().clone()).collect(),
    );
    let mut resolve = |id: &ProjectId| refs.iter().find(|r| r.id() == id).cloned();
    Arc::new(
        VersionBuilder::new(&engine)
            .build(previous.map(|v| &**v), &compilation, &mut resolve)
            .unwrap(),
    )
}

fn change<'a>(changes: &'a CompilationChanges, path: &str) -> &'a FileChange {
    changes.syntax_tree_changes.get(&FilePath::from(path)).unwrap()
}

// ─── Concrete Scenarios ──────────────────────────────────────────

#[test]
fn adding_partial_type_to_file() {
    let v1 = build(None, "App", &[("code.cs", "class C{}")], &[]);
    let v2 = build(Some(&v1), "App", &[("code.cs", "class C{} partial class D{}")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());

    assert_eq!(changes.syntax_tree_changes.len(), 1);
    let file = change(&changes, "code.cs");
    assert_eq!(file.kind, FileChangeKind::Changed);
    assert_eq!(
        file.partial_type_changes,
        vec![PartialTypeChange {
            type_name: TypeName::from("D"),
            kind: PartialTypeChangeKind::Added,
        }]
    );
    assert!(!changes.has_compile_time_code_change);
    assert!(changes.is_incremental);
}

#[test]
fn dropping_compile_time_import() {
    let v1 = build(None, "App", &[("code.cs", "using Aspects; class C{}")], &[]);
    let v2 = build(Some(&v1), "App", &[("code.cs", "class C{}")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());

    let file = change(&changes, "code.cs");
    assert_eq!(file.kind, FileChangeKind::Changed);
    assert_eq!(
        file.compile_time_transition,
        CompileTimeTransition::NoLongerCompileTime
    );
    assert!(changes.has_compile_time_code_change);
    assert!(changes.requires_pause());
}

// ─── Kinds ───────────────────────────────────────────────────────

#[test]
fn identical_versions_have_no_changes() {
    let v = build(None, "App", &[("a.cs", "using Aspects; partial class A {}")], &[]);
    let changes = diff(Some(&v), &v, DiffOptions::default());
    assert!(changes.syntax_tree_changes.is_empty());
    assert!(!changes.has_compile_time_code_change);
    assert!(changes.is_empty());
}

#[test]
fn rebuilt_identical_version_has_no_changes() {
    let v1 = build(None, "App", &[("a.cs", "class A {}")], &[]);
    let v2 = build(None, "App", &[("a.cs", "class A {}")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert!(changes.is_empty());
}

#[test]
fn first_observation_is_all_added() {
    let v = build(None, "App", &[("a.cs", "class A {}"), ("b.cs", "[CompileTime] class B {}")], &[]);
    let changes = diff(None, &v, DiffOptions::default());
    assert!(!changes.is_incremental);
    assert!(changes
        .syntax_tree_changes
        .values()
        .all(|c| c.kind == FileChangeKind::Added));
    assert!(changes.has_compile_time_code_change);
    assert!(!changes.requires_pause());
}

#[test]
fn add_and_remove_are_symmetric() {
    let small = build(None, "App", &[("a.cs", "class A {}")], &[]);
    let large = build(None, "App", &[("a.cs", "class A {}"), ("b.cs", "partial class B {}")], &[]);

    let forward = diff(Some(&small), &large, DiffOptions::default());
    let backward = diff(Some(&large), &small, DiffOptions::default());
    assert_eq!(change(&forward, "b.cs").kind, FileChangeKind::Added);
    assert_eq!(change(&backward, "b.cs").kind, FileChangeKind::Removed);
    assert_eq!(
        change(&backward, "b.cs").partial_type_changes,
        vec![PartialTypeChange {
            type_name: TypeName::from("B"),
            kind: PartialTypeChangeKind::Removed,
        }]
    );
}

#[test]
fn body_edit_of_ordinary_file_is_unchanged() {
    let v1 = build(None, "App", &[("a.cs", "class A { void M() { Run(1); } }")], &[]);
    let v2 = build(Some(&v1), "App", &[("a.cs", "class A { void M() { Run(2); } }")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert!(changes.syntax_tree_changes.is_empty());
}

#[test]
fn body_edit_of_compile_time_file_is_changed() {
    let v1 = build(None, "App", &[("a.cs", "using Aspects; class A { void M() { Run(1); } }")], &[]);
    let v2 = build(Some(&v1), "App", &[("a.cs", "using Aspects; class A { void M() { Run(2); } }")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert_eq!(change(&changes, "a.cs").kind, FileChangeKind::Changed);
    assert!(changes.has_compile_time_code_change);
}

#[test]
fn whitespace_edit_is_unchanged() {
    let v1 = build(None, "App", &[("a.cs", "class A { int x; }")], &[]);
    let v2 = build(Some(&v1), "App", &[("a.cs", "// note\nclass A\n{\n  int x;\n}\n")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert!(changes.syntax_tree_changes.is_empty());
}

#[test]
fn full_listing_reports_unchanged_files() {
    let v1 = build(None, "App", &[("a.cs", "class A {}"), ("b.cs", "class B {}")], &[]);
    let v2 = build(Some(&v1), "App", &[("a.cs", "class A {}"), ("b.cs", "class B2 {}")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::full_listing());
    assert_eq!(change(&changes, "a.cs").kind, FileChangeKind::Unchanged);
    assert_eq!(change(&changes, "b.cs").kind, FileChangeKind::Changed);

    let same = diff(Some(&v1), &v1, DiffOptions::full_listing());
    assert_eq!(same.syntax_tree_changes.len(), 2);
}

#[test]
fn partial_types_union_old_and_new() {
    let v1 = build(None, "App", &[("t.cs", "partial class T {}")], &[]);
    let v2 = build(Some(&v1), "App", &[("t.cs", "partial class U {}")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    let file = change(&changes, "t.cs");
    assert_eq!(
        file.partial_types.iter().map(TypeName::as_str).collect::<Vec<_>>(),
        vec!["T", "U"]
    );
    assert_eq!(file.partial_type_changes.len(), 2);
}

// ─── References ──────────────────────────────────────────────────

#[test]
fn reference_changes_are_nested() {
    let lib1 = build(None, "Lib", &[("m.cs", "class M {}")], &[]);
    let app1 = build(None, "App", &[("a.cs", "class A {}")], &[Arc::clone(&lib1)]);
    let lib2 = build(Some(&lib1), "Lib", &[("m.cs", "class M { int x; }")], &[]);
    let app2 = build(Some(&app1), "App", &[("a.cs", "class A {}")], &[Arc::clone(&lib2)]);

    let changes = diff(Some(&app1), &app2, DiffOptions::default());
    assert!(changes.syntax_tree_changes.is_empty());
    assert!(!changes.is_empty());
    let Some(ReferenceChanges::Changes(lib)) = changes.references.get(&ProjectId::named("Lib")) else {
        panic!("expected Lib changes");
    };
    assert!(lib.is_incremental);
    assert_eq!(change(lib, "m.cs").kind, FileChangeKind::Changed);
}

#[test]
fn unchanged_reference_short_circuits() {
    let lib = build(None, "Lib", &[("m.cs", "class M {}")], &[]);
    let app1 = build(None, "App", &[("a.cs", "class A {}")], &[Arc::clone(&lib)]);
    let app2 = build(Some(&app1), "App", &[("a.cs", "class A2 {}")], &[Arc::clone(&lib)]);
    let changes = diff(Some(&app1), &app2, DiffOptions::default());
    let Some(ReferenceChanges::Changes(lib_changes)) = changes.references.get(lib.id()) else {
        panic!("expected Lib entry");
    };
    assert!(lib_changes.is_empty());
}

#[test]
fn new_reference_is_non_incremental() {
    let lib = build(None, "Lib", &[("m.cs", "class M {}")], &[]);
    let app1 = build(None, "App", &[("a.cs", "class A {}")], &[]);
    let app2 = build(Some(&app1), "App", &[("a.cs", "class A {}")], &[Arc::clone(&lib)]);
    let changes = diff(Some(&app1), &app2, DiffOptions::default());
    let Some(ReferenceChanges::Changes(lib_changes)) = changes.references.get(lib.id()) else {
        panic!("expected Lib entry");
    };
    assert!(!lib_changes.is_incremental);
}

#[test]
fn missing_reference_is_reported() {
    let engine = Fingerprinter::new();
    let compilation = Compilation::new(
        ProjectId::named("App"),
        vec![SourceText::new("a.cs", "class A {}")],
        vec![ProjectId::named("Gone")],
    );
    let app = Arc::new(
        VersionBuilder::new(&engine)
            .build(None, &compilation, &mut |_| None)
            .unwrap(),
    );
    let changes = diff(None, &app, DiffOptions::default());
    assert_eq!(
        changes.references.get(&ProjectId::named("Gone")),
        Some(&ReferenceChanges::Missing)
    );
}

use pretty_assertions::assert_eq;
use weave_incremental::{
    diff, CompileTimeTransition, DiffOptions, FileChangeKind, PartialTypeChange,
    PartialTypeChangeKind,
};
use weave_ir::{FilePath, TypeName};

use crate::common::version;

#[test]
fn adding_a_partial_type_reports_it() {
    let v1 = version(None, "App", &[("code.cs", "class C{}")], &[]);
    let v2 = version(Some(&v1), "App", &[("code.cs", "class C{} partial class D{}")], &[]);

    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    let change = &changes.syntax_tree_changes[&FilePath::from("code.cs")];
    assert_eq!(changes.syntax_tree_changes.len(), 1);
    assert_eq!(change.kind, FileChangeKind::Changed);
    assert_eq!(
        change.partial_type_changes,
        vec![PartialTypeChange {
            type_name: TypeName::from("D"),
            kind: PartialTypeChangeKind::Added,
        }]
    );
    assert!(!changes.has_compile_time_code_change);
}

#[test]
fn dropping_the_marker_import_leaves_compile_time_code() {
    let v1 = version(None, "App", &[("code.cs", "using Aspects; class C{}")], &[]);
    let v2 = version(Some(&v1), "App", &[("code.cs", "class C{}")], &[]);

    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    let change = &changes.syntax_tree_changes[&FilePath::from("code.cs")];
    assert_eq!(
        change.compile_time_transition,
        CompileTimeTransition::NoLongerCompileTime
    );
    assert!(changes.has_compile_time_code_change);
    assert!(changes.requires_pause());
}

#[test]
fn diff_of_a_version_with_itself_is_empty() {
    let lib = version(None, "Lib", &[("m.cs", "using Aspects; class M {}")], &[]);
    let app = version(None, "App", &[("a.cs", "partial class A {}")], &[&lib]);

    for options in [DiffOptions::default(), DiffOptions::full_listing()] {
        let changes = diff(Some(&app), &app, options);
        assert!(changes.is_empty());
        assert!(!changes.has_compile_time_code_change);
        assert!(changes.changed_files().next().is_none());
    }
}

#[test]
fn trivia_edits_are_unchanged() {
    let v1 = version(None, "App", &[("a.cs", "class A { void M() { Run(); } }")], &[]);
    let v2 = version(
        Some(&v1),
        "App",
        &[("a.cs", "// header\nclass A\n{\n    void M() { /* go */ Run(); }\n}\n")],
        &[],
    );
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert!(changes.is_empty());
}

#[test]
fn body_edits_of_ordinary_code_are_unchanged() {
    let v1 = version(None, "App", &[("a.cs", "class A { int M() { return 1; } }")], &[]);
    let v2 = version(Some(&v1), "App", &[("a.cs", "class A { int M() { return 2; } }")], &[]);
    let changes = diff(Some(&v1), &v2, DiffOptions::default());
    assert!(changes.changed_files().next().is_none());
}

#[test]
fn declaration_edits_are_changes() {
    let base = "class A : Base { int M() { return 1; } }";
    let edits = [
        "class B : Base { int M() { return 1; } }",
        "class A : Other { int M() { return 1; } }",
        "class A : Base { int M() { return 1; } int N; }",
    ];
    let v1 = version(None, "App", &[("a.cs", base)], &[]);
    for edit in edits {
        let v2 = version(Some(&v1), "App", &[("a.cs", edit)], &[]);
        let changes = diff(Some(&v1), &v2, DiffOptions::default());
        assert_eq!(
            changes.syntax_tree_changes[&FilePath::from("a.cs")].kind,
            FileChangeKind::Changed,
            "{edit}"
        );
    }
}

#[test]
fn added_and_removed_are_symmetric() {
    let v1 = version(None, "App", &[("a.cs", "class A {}")], &[]);
    let v2 = version(
        Some(&v1),
        "App",
        &[("a.cs", "class A {}"), ("b.cs", "partial class B {}")],
        &[],
    );
    let forward = diff(Some(&v1), &v2, DiffOptions::default());
    let backward = diff(Some(&v2), &v1, DiffOptions::default());
    let b = FilePath::from("b.cs");
    assert_eq!(forward.syntax_tree_changes[&b].kind, FileChangeKind::Added);
    assert_eq!(backward.syntax_tree_changes[&b].kind, FileChangeKind::Removed);
    assert_eq!(
        backward.syntax_tree_changes[&b].partial_type_changes[0].kind,
        PartialTypeChangeKind::Removed
    );
}

#[test]
fn full_listing_reports_unchanged_files() {
    let v1 = version(None, "App", &[("a.cs", "class A {}"), ("b.cs", "class B {}")], &[]);
    let v2 = version(
        Some(&v1),
        "App",
        &[("a.cs", "class A {}"), ("b.cs", "class B2 {}")],
        &[],
    );
    let changes = diff(Some(&v1), &v2, DiffOptions::full_listing());
    assert_eq!(
        changes.syntax_tree_changes[&FilePath::from("a.cs")].kind,
        FileChangeKind::Unchanged
    );
    assert_eq!(changes.changed_files().count(), 1);
}

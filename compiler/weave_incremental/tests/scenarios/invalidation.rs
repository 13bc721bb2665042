use std::sync::Arc;

use pretty_assertions::assert_eq;
use weave_fingerprint::Fingerprinter;
use weave_incremental::{
    diff, invalidate, DependencyCollector, DependencyGraph, DiffOptions, ReferenceChanges,
    VersionBuilder,
};
use weave_ir::{DependencyEdge, FilePath, MasterKey};

use crate::common::{compilation, id, paths, version};

const APP: &[(&str, &str)] = &[("a.cs", "class A {}"), ("b.cs", "class B {}")];

#[test]
fn changed_master_in_reference_invalidates_dependent() {
    let m1 = version(None, "M", &[("m.cs", "class M {}")], &[]);
    let a1 = version(None, "A", APP, &[&m1]);
    let m2 = version(Some(&m1), "M", &[("m.cs", "class M : Base {}")], &[]);
    let a2 = version(Some(&a1), "A", APP, &[&m2]);

    let graph: DependencyGraph = [DependencyEdge::new(
        FilePath::from("a.cs"),
        id("M"),
        MasterKey::file("m.cs"),
    )]
    .into_iter()
    .collect();

    let changes = diff(Some(&a1), &a2, DiffOptions::default());
    assert_eq!(invalidate(&graph, &changes).files, paths(&["a.cs"]));
}

#[test]
fn editing_one_part_of_a_partial_type_invalidates_type_dependents() {
    let t1 = ("t1.cs", "partial class T { int a; }");
    let m1 = version(None, "M", &[t1, ("t2.cs", "partial class T { int b; }")], &[]);
    let a1 = version(None, "A", APP, &[&m1]);
    let m2 = version(
        Some(&m1),
        "M",
        &[t1, ("t2.cs", "partial class T { int b; void Run() {} }")],
        &[],
    );
    let a2 = version(Some(&a1), "A", APP, &[&m2]);

    let mut graph = DependencyGraph::new();
    graph.add_dependency(FilePath::from("b.cs"), id("M"), MasterKey::ty("T"));

    let changes = diff(Some(&a1), &a2, DiffOptions::default());
    assert_eq!(invalidate(&graph, &changes).files, paths(&["b.cs"]));
}

#[test]
fn update_shares_structure_of_untouched_masters() {
    let mut graph = DependencyGraph::new();
    graph.add_dependency(FilePath::from("a.cs"), id("M"), MasterKey::file("m.cs"));
    graph.add_dependency(FilePath::from("b.cs"), id("N"), MasterKey::file("n.cs"));

    let mut collector = DependencyCollector::new();
    collector.add_dependency("a.cs", id("M"), MasterKey::file("k.cs"));
    let updated = graph.update(&paths(&["a.cs"]), &collector);

    assert!(Arc::ptr_eq(
        graph.project(&id("N")).unwrap(),
        updated.project(&id("N")).unwrap()
    ));
    assert!(updated.dependents(&id("M"), &MasterKey::file("m.cs")).is_none());
    assert_eq!(
        **updated.dependents(&id("M"), &MasterKey::file("k.cs")).unwrap(),
        paths(&["a.cs"])
    );
    // The original is untouched.
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn missing_or_dropped_reference_invalidates_all_its_dependents() {
    let m1 = version(None, "M", &[("m.cs", "class M {}")], &[]);
    let a1 = version(None, "A", APP, &[&m1]);

    let mut graph = DependencyGraph::new();
    graph.add_dependency(FilePath::from("a.cs"), id("M"), MasterKey::file("m.cs"));
    graph.add_dependency(FilePath::from("b.cs"), id("M"), MasterKey::ty("X"));

    let dropped = version(Some(&a1), "A", APP, &[]);
    let changes = diff(Some(&a1), &dropped, DiffOptions::default());
    assert_eq!(changes.references.get(&id("M")), Some(&ReferenceChanges::Missing));
    assert_eq!(invalidate(&graph, &changes).files, paths(&["a.cs", "b.cs"]));

    let engine = Fingerprinter::new();
    let unresolved = VersionBuilder::new(&engine)
        .build(Some(&*a1), &compilation("A", APP, &["M"]), &mut |_| None)
        .unwrap();
    let changes = diff(Some(&a1), &Arc::new(unresolved), DiffOptions::default());
    assert_eq!(invalidate(&graph, &changes).files, paths(&["a.cs", "b.cs"]));
}

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use weave_fingerprint::Fingerprinter;
use weave_incremental::{Notification, PipelineStatus, Session, SnapshotOutcome};

use crate::common::{compilation, id};

fn session() -> Session {
    let session = Session::new(Arc::new(Fingerprinter::new()));
    session
        .on_new_snapshot(compilation("M", &[("m.cs", "class M {}")], &[]))
        .unwrap();
    session
        .on_new_snapshot(compilation("A", &[("a.cs", "class A {}")], &["M"]))
        .unwrap();
    session
        .on_new_snapshot(compilation("B", &[("b.cs", "class B {}")], &["A"]))
        .unwrap();
    session
}

#[test]
fn compile_time_change_pauses_transitive_dependents_until_resume() {
    let session = session();
    let receiver = session.subscribe();
    let listener = thread::spawn(move || receiver.iter().collect::<Vec<_>>());

    let outcome = session
        .on_new_snapshot(compilation("M", &[("m.cs", "[CompileTime] class M {}")], &[]))
        .unwrap();
    assert!(matches!(outcome, SnapshotOutcome::Paused { ref causes, .. } if causes == &BTreeSet::from([id("M")])));
    for project in ["M", "A", "B"] {
        assert_eq!(
            session.status(&id(project)),
            Some(PipelineStatus::Paused {
                paused_by: BTreeSet::from([id("M")])
            }),
            "{project}"
        );
    }

    session.resume(&id("M")).unwrap();
    for project in ["M", "A", "B"] {
        assert_eq!(session.status(&id(project)), Some(PipelineStatus::Default), "{project}");
    }

    session.shutdown();
    let notes = listener.join().unwrap();
    let paused: BTreeSet<_> = notes
        .iter()
        .filter(|n| matches!(n, Notification::PipelinePaused { .. }))
        .map(|n| n.project().clone())
        .collect();
    let resumed: BTreeSet<_> = notes
        .iter()
        .filter(|n| matches!(n, Notification::PipelineResumed { .. }))
        .map(|n| n.project().clone())
        .collect();
    let all = BTreeSet::from([id("M"), id("A"), id("B")]);
    assert_eq!(paused, all);
    assert_eq!(resumed, all);
}

#[test]
fn unrelated_projects_keep_running() {
    let session = session();
    session
        .on_new_snapshot(compilation("Other", &[("o.cs", "class O {}")], &[]))
        .unwrap();
    session
        .on_new_snapshot(compilation("M", &[("m.cs", "using Aspects.Advice; class M {}")], &[]))
        .unwrap();

    assert_eq!(session.status(&id("Other")), Some(PipelineStatus::Default));
    let outcome = session
        .on_new_snapshot(compilation("Other", &[("o.cs", "class O { int x; }")], &[]))
        .unwrap();
    assert!(!outcome.is_paused());
}

#[test]
fn concurrent_snapshots_of_different_projects() {
    let session = Arc::new(Session::new(Arc::new(Fingerprinter::new())));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let name = format!("P{n}");
                let text = format!("class C{n} {{}}");
                for round in 0..5 {
                    let body = format!("{text} class R{round} {{}}");
                    let outcome = session
                        .on_new_snapshot(compilation(&name, &[("c.cs", body.as_str())], &[]))
                        .unwrap();
                    assert!(!outcome.is_paused());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(session.projects().len(), 8);
    for project in session.projects() {
        let version = session.current_version(&project).unwrap();
        let file = version.files().values().next().unwrap();
        assert!(file.text().contains("class R4"));
    }
}

//! Dependency invalidation.
//!
//! Turns the changes of a project and of everything it references into the
//! set of its own files that must be re-analysed.
//!
//! # Rules
//!
//! For every project `P` with changes `C` (the project itself included,
//! references flattened transitively):
//!
//! 1. each changed, added or removed file `f` reaches the dependents of
//!    `FileMaster(f)` and of `TypeMaster(t)` for every partial type `t` the
//!    file contributes to in either version
//! 2. each partial-type event `(t, _)` reaches the dependents of `TypeMaster(t)`
//! 3. a non-incremental or missing `P` reaches every dependent of `P`
//! 4. `C.requires_pause()` adds `P` to `paused_by`
//!
//! The project's own added and changed files are always included. Files that
//! no longer exist are reported in `removed`, never in `files`.

use std::collections::{BTreeMap, BTreeSet};

use weave_ir::{FilePath, ProjectId};

use crate::diff::{CompilationChanges, FileChangeKind, ReferenceChanges};
use crate::graph::DependencyGraph;

/// Outcome of one invalidation pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invalidation {
    /// Existing files of the project to re-analyse.
    pub files: BTreeSet<FilePath>,
    /// Own files that were removed; their edges must be dropped.
    pub removed: BTreeSet<FilePath>,
    /// Projects whose compile-time change forbids an incremental update.
    pub paused_by: BTreeSet<ProjectId>,
}

impl Invalidation {
    pub fn requires_pause(&self) -> bool {
        !self.paused_by.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.removed.is_empty() && self.paused_by.is_empty()
    }

    /// Files whose dependency edges are stale: re-analysed plus removed.
    pub fn stale_dependents(&self) -> BTreeSet<FilePath> {
        self.files.union(&self.removed).cloned().collect()
    }
}

/// Per-project input of [`invalidate_projects`].
#[derive(Copy, Clone, Debug)]
pub enum ProjectChanges<'a> {
    Changes(&'a CompilationChanges),
    Missing,
}

/// Invalidate against `changes` and every reference change nested in it.
#[tracing::instrument(level = "debug", skip_all, fields(project = %changes.project()))]
pub fn invalidate(graph: &DependencyGraph, changes: &CompilationChanges) -> Invalidation {
    let mut by_project = BTreeMap::new();
    by_project.insert(changes.project().clone(), ProjectChanges::Changes(changes));
    flatten_references(changes, &mut by_project);
    invalidate_projects(graph, changes, &by_project)
}

/// Invalidate the files of `own.new_version` against explicit per-project
/// changes.
pub fn invalidate_projects(
    graph: &DependencyGraph,
    own: &CompilationChanges,
    changes_by_project: &BTreeMap<ProjectId, ProjectChanges<'_>>,
) -> Invalidation {
    let mut invalidation = Invalidation::default();

    for (project, changes) in changes_by_project {
        match changes {
            ProjectChanges::Missing => {
                tracing::warn!(%project, "missing reference: invalidating all dependents");
                invalidation.files.extend(graph.all_dependents(project));
            }
            ProjectChanges::Changes(changes) => {
                collect_dependents(graph, project, changes, &mut invalidation.files);
                if changes.requires_pause() {
                    invalidation.paused_by.insert(project.clone());
                }
            }
        }
    }

    for change in own.changed_files() {
        match change.kind {
            FileChangeKind::Added | FileChangeKind::Changed => {
                invalidation.files.insert(change.path.clone());
            }
            FileChangeKind::Removed => {
                invalidation.removed.insert(change.path.clone());
            }
            FileChangeKind::Unchanged => {}
        }
    }
    if own.requires_pause() {
        invalidation.paused_by.insert(own.project().clone());
    }

    let version = &own.new_version;
    let (existing, gone): (BTreeSet<_>, BTreeSet<_>) = invalidation
        .files
        .into_iter()
        .partition(|file| version.contains_file(file));
    invalidation.files = existing;
    invalidation.removed.extend(gone);

    tracing::debug!(
        files = invalidation.files.len(),
        removed = invalidation.removed.len(),
        paused = invalidation.requires_pause(),
        "invalidated"
    );
    invalidation
}

fn collect_dependents(
    graph: &DependencyGraph,
    project: &ProjectId,
    changes: &CompilationChanges,
    out: &mut BTreeSet<FilePath>,
) {
    if !changes.is_incremental {
        out.extend(graph.all_dependents(project));
        return;
    }
    let Some(dependencies) = graph.project(project) else {
        return;
    };
    for change in changes.changed_files() {
        if let Some(set) = dependencies.file_dependents(&change.path) {
            out.extend(set.iter().cloned());
        }
        for name in change.partial_types.iter() {
            if let Some(set) = dependencies.type_dependents(name) {
                out.extend(set.iter().cloned());
            }
        }
    }
    for change in changes.syntax_tree_changes.values() {
        for event in &change.partial_type_changes {
            if let Some(set) = dependencies.type_dependents(&event.type_name) {
                out.extend(set.iter().cloned());
            }
        }
    }
}

/// Collect reference changes transitively. The first occurrence of a
/// project wins.
fn flatten_references<'a>(
    changes: &'a CompilationChanges,
    out: &mut BTreeMap<ProjectId, ProjectChanges<'a>>,
) {
    for (project, reference) in &changes.references {
        if out.contains_key(project) {
            continue;
        }
        match reference {
            ReferenceChanges::Missing => {
                out.insert(project.clone(), ProjectChanges::Missing);
            }
            ReferenceChanges::Changes(nested) => {
                out.insert(project.clone(), ProjectChanges::Changes(nested));
                flatten_references(nested, out);
            }
        }
    }
}

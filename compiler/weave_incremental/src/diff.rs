//! Structural diff between two project versions.
//!
//! Files are matched by path. Only hashes are compared: the diff never looks
//! at source text, so it runs in time proportional to the number of files
//! regardless of their size.
//!
//! | old | new | hashes                                 | kind        |
//! |-----|-----|----------------------------------------|-------------|
//! | -   | yes |                                        | `Added`     |
//! | yes | -   |                                        | `Removed`   |
//! | yes | yes | declaration differs                    | `Changed`   |
//! | yes | yes | body differs, either side compile-time | `Changed`   |
//! | yes | yes | otherwise                              | `Unchanged` |
//!
//! References are diffed recursively: the reference version recorded in the
//! old snapshot against the one recorded in the new snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use weave_ir::{FilePath, ProjectId, TypeName};

use crate::config::DiffOptions;
use crate::version::{FileVersion, ProjectVersion};

/// How one file changed between two versions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FileChangeKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// Change of a file's compile-time classification.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CompileTimeTransition {
    #[default]
    None,
    NewlyCompileTime,
    NoLongerCompileTime,
}

impl CompileTimeTransition {
    fn between(old: bool, new: bool) -> Self {
        match (old, new) {
            (false, true) => CompileTimeTransition::NewlyCompileTime,
            (true, false) => CompileTimeTransition::NoLongerCompileTime,
            _ => CompileTimeTransition::None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PartialTypeChangeKind {
    Added,
    Removed,
}

/// A file started or stopped contributing to a partial type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PartialTypeChange {
    pub type_name: TypeName,
    pub kind: PartialTypeChangeKind,
}

/// Change record for one file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileChange {
    pub path: FilePath,
    pub kind: FileChangeKind,
    pub compile_time_transition: CompileTimeTransition,
    pub partial_type_changes: Vec<PartialTypeChange>,
    /// Partial types the file contributes to in either version.
    pub partial_types: Arc<BTreeSet<TypeName>>,
    /// The file is compile-time code in either version.
    pub is_compile_time_code: bool,
}

impl FileChange {
    /// `true` for anything but `Unchanged`.
    pub fn is_change(&self) -> bool {
        self.kind != FileChangeKind::Unchanged
    }
}

/// Changes of one referenced project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReferenceChanges {
    Changes(Arc<CompilationChanges>),
    /// The reference's version could not be obtained, or the reference was
    /// dropped. Everything that depends on it must be treated as changed.
    Missing,
}

/// Result of diffing two versions of one project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompilationChanges {
    pub new_version: Arc<ProjectVersion>,
    pub syntax_tree_changes: BTreeMap<FilePath, FileChange>,
    pub has_compile_time_code_change: bool,
    /// `false` when there was no previous version to diff against.
    pub is_incremental: bool,
    pub references: BTreeMap<ProjectId, ReferenceChanges>,
}

impl CompilationChanges {
    pub fn project(&self) -> &ProjectId {
        self.new_version.id()
    }

    /// A compile-time change on an incremental diff. First observations
    /// never pause.
    pub fn requires_pause(&self) -> bool {
        self.is_incremental && self.has_compile_time_code_change
    }

    /// Entries that are not `Unchanged`.
    pub fn changed_files(&self) -> impl Iterator<Item = &FileChange> {
        self.syntax_tree_changes.values().filter(|c| c.is_change())
    }

    /// `true` if neither this project nor any reference changed.
    pub fn is_empty(&self) -> bool {
        self.is_incremental
            && !self.has_compile_time_code_change
            && self.changed_files().next().is_none()
            && self.references.values().all(|r| match r {
                ReferenceChanges::Changes(changes) => changes.is_empty(),
                ReferenceChanges::Missing => false,
            })
    }
}

/// Diff `new` against `old`. A `None` old version reports every file as
/// `Added` with `is_incremental = false`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(project = %new.id(), incremental = old.is_some())
)]
pub fn diff(
    old: Option<&Arc<ProjectVersion>>,
    new: &Arc<ProjectVersion>,
    options: DiffOptions,
) -> CompilationChanges {
    let mut visited = FxHashSet::default();
    diff_inner(old, new, options, &mut visited)
}

fn diff_inner(
    old: Option<&Arc<ProjectVersion>>,
    new: &Arc<ProjectVersion>,
    options: DiffOptions,
    visited: &mut FxHashSet<ProjectId>,
) -> CompilationChanges {
    visited.insert(new.id().clone());

    let mut changes = CompilationChanges {
        new_version: Arc::clone(new),
        syntax_tree_changes: BTreeMap::new(),
        has_compile_time_code_change: false,
        is_incremental: old.is_some(),
        references: BTreeMap::new(),
    };

    if old.is_some_and(|old| Arc::ptr_eq(old, new)) && !options.include_unchanged {
        return changes;
    }

    let old_files = old.map(|old| old.files());
    for (path, new_file) in new.files() {
        let old_file = old_files.and_then(|files| files.get(path));
        let change = match old_file {
            Some(old_file) => compare(old_file, new_file),
            None => added(new_file),
        };
        record(&mut changes, change, options);
    }
    if let Some(old_files) = old_files {
        for (path, old_file) in old_files {
            if !new.contains_file(path) {
                record(&mut changes, removed(old_file), options);
            }
        }
    }

    for (id, new_ref) in new.references() {
        if visited.contains(id) {
            continue;
        }
        let entry = match new_ref {
            None => ReferenceChanges::Missing,
            Some(new_ref) => {
                let old_ref = old.and_then(|old| old.reference(id));
                ReferenceChanges::Changes(Arc::new(diff_inner(old_ref, new_ref, options, visited)))
            }
        };
        changes.references.insert(id.clone(), entry);
    }
    if let Some(old) = old {
        for id in old.references().keys() {
            if !new.references().contains_key(id) && !visited.contains(id) {
                changes.references.insert(id.clone(), ReferenceChanges::Missing);
            }
        }
    }

    tracing::debug!(
        project = %new.id(),
        changed = changes.changed_files().count(),
        compile_time = changes.has_compile_time_code_change,
        "diffed"
    );
    changes
}

fn record(changes: &mut CompilationChanges, change: FileChange, options: DiffOptions) {
    let transitioned = change.compile_time_transition != CompileTimeTransition::None;
    if transitioned || (change.is_change() && change.is_compile_time_code) {
        changes.has_compile_time_code_change = true;
    }

    if change.is_change() || options.include_unchanged {
        changes.syntax_tree_changes.insert(change.path.clone(), change);
    }
}

fn added(file: &FileVersion) -> FileChange {
    FileChange {
        path: file.path.clone(),
        kind: FileChangeKind::Added,
        compile_time_transition: CompileTimeTransition::None,
        partial_type_changes: partial_events(&file.partial_types, PartialTypeChangeKind::Added),
        partial_types: Arc::clone(&file.partial_types),
        is_compile_time_code: file.is_compile_time_code,
    }
}

fn removed(file: &FileVersion) -> FileChange {
    FileChange {
        path: file.path.clone(),
        kind: FileChangeKind::Removed,
        compile_time_transition: CompileTimeTransition::None,
        partial_type_changes: partial_events(&file.partial_types, PartialTypeChangeKind::Removed),
        partial_types: Arc::clone(&file.partial_types),
        is_compile_time_code: file.is_compile_time_code,
    }
}

fn compare(old: &Arc<FileVersion>, new: &Arc<FileVersion>) -> FileChange {
    let is_compile_time_code = old.is_compile_time_code || new.is_compile_time_code;
    let kind = if Arc::ptr_eq(old, new) {
        FileChangeKind::Unchanged
    } else if old.declaration_hash != new.declaration_hash
        || old.is_compile_time_code != new.is_compile_time_code
        || old.partial_types != new.partial_types
        || (is_compile_time_code && old.body_hash != new.body_hash)
    {
        FileChangeKind::Changed
    } else {
        FileChangeKind::Unchanged
    };

    let mut partial_type_changes = Vec::new();
    let partial_types = if Arc::ptr_eq(&old.partial_types, &new.partial_types)
        || old.partial_types == new.partial_types
    {
        Arc::clone(&new.partial_types)
    } else {
        for name in new.partial_types.difference(&old.partial_types) {
            partial_type_changes.push(PartialTypeChange {
                type_name: name.clone(),
                kind: PartialTypeChangeKind::Added,
            });
        }
        for name in old.partial_types.difference(&new.partial_types) {
            partial_type_changes.push(PartialTypeChange {
                type_name: name.clone(),
                kind: PartialTypeChangeKind::Removed,
            });
        }
        Arc::new(old.partial_types.union(&new.partial_types).cloned().collect())
    };

    FileChange {
        path: new.path.clone(),
        kind,
        compile_time_transition: CompileTimeTransition::between(
            old.is_compile_time_code,
            new.is_compile_time_code,
        ),
        partial_type_changes,
        partial_types,
        is_compile_time_code,
    }
}

fn partial_events(types: &BTreeSet<TypeName>, kind: PartialTypeChangeKind) -> Vec<PartialTypeChange> {
    types
        .iter()
        .map(|name| PartialTypeChange {
            type_name: name.clone(),
            kind,
        })
        .collect()
}

#[cfg(test)]
mod tests;

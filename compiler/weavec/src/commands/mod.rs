//! Command handlers for the `weave` CLI.
//!
//! Each handler returns its report as text; the binary prints it. Shared
//! rendering lives here in the module root.

use std::fmt::{self, Display, Write};
use std::path::Path;

use weave_incremental::{
    CompilationChanges, CompileTimeTransition, FileChange, FileChangeKind, Notification,
    PartialTypeChangeKind, ReferenceChanges,
};
use weave_ir::ProjectId;

use crate::CommandError;

mod diff;
mod explain;
mod fingerprint;
mod replay;

pub use diff::diff_directories;
pub use explain::explain_invalidation;
pub use fingerprint::fingerprint_files;
pub use replay::replay_snapshots;

/// Project identity used for directory snapshots.
pub const SNAPSHOT_PROJECT: &str = "project";

fn snapshot_project() -> ProjectId {
    ProjectId::named(SNAPSHOT_PROJECT)
}

fn read_file(path: &Path) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|e| CommandError::io(path, e))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn kind_label(kind: FileChangeKind) -> &'static str {
    match kind {
        FileChangeKind::Added => "added",
        FileChangeKind::Removed => "removed",
        FileChangeKind::Changed => "changed",
        FileChangeKind::Unchanged => "unchanged",
    }
}

fn render_file_change(out: &mut String, change: &FileChange, indent: usize) -> fmt::Result {
    write!(
        out,
        "{:indent$}{:<10}{}",
        "",
        kind_label(change.kind),
        change.path
    )?;
    match change.compile_time_transition {
        CompileTimeTransition::NewlyCompileTime => write!(out, "  (now compile-time)")?,
        CompileTimeTransition::NoLongerCompileTime => write!(out, "  (no longer compile-time)")?,
        CompileTimeTransition::None if change.is_compile_time_code => {
            write!(out, "  [compile-time]")?;
        }
        CompileTimeTransition::None => {}
    }
    for partial in &change.partial_type_changes {
        let sign = match partial.kind {
            PartialTypeChangeKind::Added => '+',
            PartialTypeChangeKind::Removed => '-',
        };
        write!(out, "  {sign}partial {}", partial.type_name)?;
    }
    writeln!(out)
}

/// Render `changes` and, nested below, the changes of its references.
fn render_changes(out: &mut String, changes: &CompilationChanges, indent: usize) -> fmt::Result {
    let mode = if changes.is_incremental {
        "incremental"
    } else {
        "first observation"
    };
    writeln!(out, "{:indent$}{} ({mode})", "", changes.project())?;
    let mut any = false;
    for change in changes.syntax_tree_changes.values() {
        any = true;
        render_file_change(out, change, indent + 2)?;
    }
    if !any {
        writeln!(out, "{:indent$}  no file changes", "")?;
    }
    for (id, reference) in &changes.references {
        match reference {
            ReferenceChanges::Missing => writeln!(out, "{:indent$}  reference {id} missing", "")?,
            ReferenceChanges::Changes(nested) if !nested.is_empty() => {
                render_changes(out, nested, indent + 2)?;
            }
            ReferenceChanges::Changes(_) => {}
        }
    }
    writeln!(
        out,
        "{:indent$}  compile-time change: {}",
        "",
        yes_no(changes.has_compile_time_code_change)
    )
}

fn describe(note: &Notification) -> String {
    match note {
        Notification::DirtyProject { project } => format!("{project} dirty"),
        Notification::PipelinePaused { project, causes } => {
            format!("{project} paused by {}", join(causes))
        }
        Notification::PipelineResumed { project } => format!("{project} resumed"),
    }
}

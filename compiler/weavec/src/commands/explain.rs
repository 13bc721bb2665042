//! The `explain` command: which files a change forces to re-analyse.

use std::fmt::Write;
use std::path::Path;

use weave_incremental::{diff, invalidate, DependencyGraph, DiffOptions};

use super::diff::build_pair;
use super::{join, read_file, snapshot_project};
use crate::{parse_edges, CommandError};

/// Diff two snapshots and invalidate against the edges listed in `deps`.
pub fn explain_invalidation(old: &Path, new: &Path, deps: &Path) -> Result<String, CommandError> {
    let project = snapshot_project();
    let collector = parse_edges(deps, &read_file(deps)?, &project)?;
    let graph: DependencyGraph = collector.edges().cloned().collect();

    let (old, new) = build_pair(old, new)?;
    let changes = diff(Some(&old), &new, DiffOptions::default());
    let invalidation = invalidate(&graph, &changes);

    let mut out = String::new();
    if invalidation.files.is_empty() {
        writeln!(out, "nothing to re-analyse")?;
    } else {
        writeln!(out, "re-analyse: {}", join(&invalidation.files))?;
    }
    if !invalidation.removed.is_empty() {
        writeln!(out, "removed:    {}", join(&invalidation.removed))?;
    }
    if invalidation.requires_pause() {
        writeln!(out, "paused by:  {}", join(&invalidation.paused_by))?;
    }
    Ok(out)
}

//! The `replay` command: feed successive snapshots through a session.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use weave_fingerprint::Fingerprinter;
use weave_incremental::{DependencyCollector, Session, SnapshotOutcome};
use weave_ir::FilePath;

use super::{describe, join, read_file, snapshot_project};
use crate::{load_project, parse_edges, CommandError};

/// Replay `snapshots` in order as versions of one project.
///
/// After each analysed snapshot the edges from `deps` are recorded for the
/// re-analysed files. A pause is followed by a resume, standing in for the
/// full rebuild a host would run.
pub fn replay_snapshots(snapshots: &[PathBuf], deps: Option<&Path>) -> Result<String, CommandError> {
    let project = snapshot_project();
    let collector = match deps {
        Some(deps) => parse_edges(deps, &read_file(deps)?, &project)?,
        None => DependencyCollector::new(),
    };
    let session = Session::new(Arc::new(Fingerprinter::new()));
    let notes = session.subscribe();
    let mut out = String::new();

    for (step, dir) in snapshots.iter().enumerate() {
        writeln!(out, "snapshot {} ({})", step + 1, dir.display())?;
        let compilation = load_project(dir, project.clone(), Vec::new())?;
        match session.on_new_snapshot(compilation)? {
            SnapshotOutcome::Analyzed(plan) => {
                writeln!(out, "  analyse: {}", render_files(plan.files()))?;
                session.record_analysis(&project, plan.files(), &collector)?;
            }
            SnapshotOutcome::Paused { causes, .. } => {
                writeln!(out, "  paused by {}", join(&causes))?;
                if let Some(plan) = session.resume(&project)? {
                    writeln!(out, "  full rebuild: {} files", plan.version.len())?;
                    let analyzed = plan.version.files().keys().cloned().collect();
                    session.record_analysis(&project, &analyzed, &collector)?;
                }
            }
        }
        for note in notes.try_iter() {
            writeln!(out, "  notify: {}", describe(&note))?;
        }
    }
    session.shutdown();
    Ok(out)
}

fn render_files(files: &BTreeSet<FilePath>) -> String {
    if files.is_empty() {
        "nothing".to_string()
    } else {
        join(files)
    }
}

//! The `diff` command: compare two directory snapshots of one project.

use std::path::Path;
use std::sync::Arc;

use weave_fingerprint::Fingerprinter;
use weave_incremental::{diff, DiffOptions, ProjectVersion, VersionBuilder};

use super::{render_changes, snapshot_project};
use crate::{load_project, CommandError};

/// Build both snapshots and render their diff.
pub fn diff_directories(
    old: &Path,
    new: &Path,
    options: DiffOptions,
) -> Result<String, CommandError> {
    let (old, new) = build_pair(old, new)?;
    let changes = diff(Some(&old), &new, options);
    let mut out = String::new();
    render_changes(&mut out, &changes, 0)?;
    if changes.requires_pause() {
        out.push_str("pipeline would pause\n");
    }
    Ok(out)
}

/// Versions of the same project built from two directories, the second
/// reusing the fingerprints of the first.
pub(super) fn build_pair(
    old: &Path,
    new: &Path,
) -> Result<(Arc<ProjectVersion>, Arc<ProjectVersion>), CommandError> {
    let engine = Fingerprinter::new();
    let builder = VersionBuilder::new(&engine);
    let old = load_project(old, snapshot_project(), Vec::new())?;
    let new = load_project(new, snapshot_project(), Vec::new())?;
    let old = Arc::new(builder.build(None, &old, &mut |_| None)?);
    let new = Arc::new(builder.build(Some(&*old), &new, &mut |_| None)?);
    Ok((old, new))
}

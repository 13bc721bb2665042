//! Directory snapshots and dependency listings.

use std::fs;
use std::path::Path;

use weave_incremental::{Compilation, DependencyCollector, SourceText};
use weave_ir::{FilePath, MasterKey, ProjectId};

use crate::CommandError;

/// Extension of the files a directory snapshot picks up.
pub const SOURCE_EXTENSION: &str = "cs";

/// Read every source under `root` into a compilation of `id`.
///
/// Paths are relative to `root` with `/` separators, in sorted order.
pub fn load_project(
    root: &Path,
    id: ProjectId,
    references: Vec<ProjectId>,
) -> Result<Compilation, CommandError> {
    let mut files = Vec::new();
    collect_sources(root, root, &mut files)?;
    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "loaded snapshot");
    let sources = files
        .into_iter()
        .map(|(path, text)| SourceText::new(path, text))
        .collect();
    Ok(Compilation::new(id, sources, references))
}

fn collect_sources(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(FilePath, String)>,
) -> Result<(), CommandError> {
    let entries = fs::read_dir(dir).map_err(|e| CommandError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CommandError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| CommandError::io(&path, e))?;
        if file_type.is_dir() {
            collect_sources(root, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            let text = fs::read_to_string(&path).map_err(|e| CommandError::io(&path, e))?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            out.push((FilePath::normalized(relative.to_string_lossy()), text));
        }
    }
    Ok(())
}

/// Parse a dependency listing into edges on masters of `project`.
///
/// One edge per line, `dependent -> master`, where `master` is a file path
/// or `type:Name`. Blank lines and `#` comments are skipped.
pub fn parse_edges(
    path: &Path,
    text: &str,
    project: &ProjectId,
) -> Result<DependencyCollector, CommandError> {
    let mut collector = DependencyCollector::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || CommandError::MalformedEdge {
            path: path.to_path_buf(),
            line: index + 1,
            text: line.to_string(),
        };
        let (dependent, master) = line.split_once("->").ok_or_else(malformed)?;
        let (dependent, master) = (dependent.trim(), master.trim());
        if dependent.is_empty() || master.is_empty() {
            return Err(malformed());
        }
        let master = match master.strip_prefix("type:") {
            Some(name) if !name.trim().is_empty() => MasterKey::ty(name.trim()),
            Some(_) => return Err(malformed()),
            None => MasterKey::file(FilePath::normalized(master)),
        };
        collector.add_dependency(FilePath::normalized(dependent), project.clone(), master);
    }
    Ok(collector)
}

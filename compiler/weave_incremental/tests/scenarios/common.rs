use std::collections::BTreeSet;
use std::sync::Arc;

use weave_fingerprint::Fingerprinter;
use weave_incremental::{Compilation, ProjectVersion, SourceText, VersionBuilder};
use weave_ir::{FilePath, ProjectId};

pub fn id(name: &str) -> ProjectId {
    ProjectId::named(name)
}

pub fn paths(paths: &[&str]) -> BTreeSet<FilePath> {
    paths.iter().map(|p| FilePath::from(*p)).collect()
}

pub fn compilation(name: &str, files: &[(&str, &str)], refs: &[&str]) -> Compilation {
    Compilation::new(
        id(name),
        files.iter().map(|(p, t)| SourceText::new(*p, *t)).collect(),
        refs.iter().map(|r| id(r)).collect(),
    )
}

/// Build a version of `name`, resolving references among `refs`.
pub fn version(
    previous: Option<&Arc<ProjectVersion>>,
    name: &str,
    files: &[(&str, &str)],
    refs: &[&Arc<ProjectVersion>],
) -> Arc<ProjectVersion> {
    let engine = Fingerprinter::new();
    let names: Vec<&str> = refs.iter().map(|r| r.id().name()).collect();
    let compilation = compilation(name, files, &names);
    let mut resolve = |id: &ProjectId| refs.iter().find(|r| r.id() == id).map(|r| Arc::clone(r));
    Arc::new(
        VersionBuilder::new(&engine)
            .build(previous.map(|v| &**v), &compilation, &mut resolve)
            .unwrap(),
    )
}

//! Project versions: immutable, fingerprinted snapshots of a source set.
//!
//! # Architecture
//!
//! ```text
//! Compilation (sources + reference ids)
//!      │
//!      ▼
//! VersionBuilder::build(previous, compilation, resolve)
//!      │  ├── same Arc<str> or same text hash ──► reuse previous Arc<FileVersion>
//!      │  ├── otherwise ──► TransformationEngine::classify_file (rayon above threshold)
//!      │  └── references ──► resolve(id) ──► Some(version) | None (missing)
//!      ▼
//! ProjectVersion { files: im::OrdMap<FilePath, Arc<FileVersion>>, references }
//! ```
//!
//! File maps are persistent, so a version built from a previous one shares
//! every untouched subtree with it.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use weave_fingerprint::text_hash;
use weave_ir::{FilePath, ProjectId, TypeName};

use crate::config::BuildOptions;
use crate::engine::TransformationEngine;
use crate::error::ClassifierError;

// ─── Input ───────────────────────────────────────────────────────

/// Text of one source file as handed over by the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceText {
    pub path: FilePath,
    pub text: Arc<str>,
}

impl SourceText {
    pub fn new(path: impl Into<FilePath>, text: impl Into<Arc<str>>) -> Self {
        SourceText {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// One raw compilation snapshot of a project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Compilation {
    id: ProjectId,
    sources: Vec<SourceText>,
    references: Vec<ProjectId>,
    snapshot_key: u64,
}

impl Compilation {
    pub fn new(id: ProjectId, sources: Vec<SourceText>, references: Vec<ProjectId>) -> Self {
        let snapshot_key = snapshot_key(&id, &sources, &references);
        Compilation {
            id,
            sources,
            references,
            snapshot_key,
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn sources(&self) -> &[SourceText] {
        &self.sources
    }

    pub fn references(&self) -> &[ProjectId] {
        &self.references
    }

    /// Identity of the snapshot content. Two compilations with equal keys
    /// are treated as the same request.
    pub fn snapshot_key(&self) -> u64 {
        self.snapshot_key
    }
}

fn snapshot_key(id: &ProjectId, sources: &[SourceText], references: &[ProjectId]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(id.name().as_bytes());
    hasher.write_u8(0xff);
    hasher.write(id.marker().as_bytes());
    hasher.write_u8(0xff);
    for source in sources {
        hasher.write(source.path.as_str().as_bytes());
        hasher.write_u8(0xff);
        hasher.write_u64(text_hash(&source.text));
    }
    hasher.write_u8(0xfe);
    for reference in references {
        hasher.write(reference.name().as_bytes());
        hasher.write_u8(0xff);
        hasher.write(reference.marker().as_bytes());
        hasher.write_u8(0xff);
    }
    hasher.finish()
}

// ─── Versions ────────────────────────────────────────────────────

/// Fingerprint of one file in one snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileVersion {
    pub path: FilePath,
    pub text_hash: u64,
    pub declaration_hash: u64,
    pub body_hash: u64,
    pub is_compile_time_code: bool,
    pub partial_types: Arc<BTreeSet<TypeName>>,
    text: Arc<str>,
}

impl FileVersion {
    /// The text this version was computed from.
    pub fn text(&self) -> &Arc<str> {
        &self.text
    }

    /// `true` if this version can stand in for `source` without
    /// reclassification.
    fn matches(&self, source: &SourceText) -> bool {
        Arc::ptr_eq(&self.text, &source.text)
            || (self.text.len() == source.text.len() && self.text_hash == text_hash(&source.text))
    }
}

/// Immutable snapshot of one project and, recursively, its references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectVersion {
    id: ProjectId,
    files: im::OrdMap<FilePath, Arc<FileVersion>>,
    /// `None` marks a reference whose version could not be obtained.
    references: BTreeMap<ProjectId, Option<Arc<ProjectVersion>>>,
}

impl ProjectVersion {
    /// Version with no files and no references.
    pub fn empty(id: ProjectId) -> Self {
        ProjectVersion {
            id,
            files: im::OrdMap::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn files(&self) -> &im::OrdMap<FilePath, Arc<FileVersion>> {
        &self.files
    }

    pub fn file(&self, path: &FilePath) -> Option<&Arc<FileVersion>> {
        self.files.get(path)
    }

    pub fn contains_file(&self, path: &FilePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn references(&self) -> &BTreeMap<ProjectId, Option<Arc<ProjectVersion>>> {
        &self.references
    }

    /// Resolved version of a reference. `None` if the reference is unknown
    /// or missing.
    pub fn reference(&self, id: &ProjectId) -> Option<&Arc<ProjectVersion>> {
        self.references.get(id).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `true` if any file in this project is compile-time code.
    pub fn has_compile_time_code(&self) -> bool {
        self.files.values().any(|file| file.is_compile_time_code)
    }
}

// ─── Builder ─────────────────────────────────────────────────────

/// Builds [`ProjectVersion`]s, reusing file versions from a previous one.
pub struct VersionBuilder<'e> {
    engine: &'e dyn TransformationEngine,
    options: BuildOptions,
}

impl<'e> VersionBuilder<'e> {
    pub fn new(engine: &'e dyn TransformationEngine) -> Self {
        VersionBuilder {
            engine,
            options: BuildOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the version of `compilation`.
    ///
    /// Files whose text is unchanged since `previous` keep their previous
    /// `Arc<FileVersion>`. `resolve` supplies the current version of each
    /// referenced project; `None` records the reference as missing. When a
    /// path appears twice in the compilation the last source wins.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(project = %compilation.id(), files = compilation.sources().len())
    )]
    pub fn build(
        &self,
        previous: Option<&ProjectVersion>,
        compilation: &Compilation,
        resolve: &mut dyn FnMut(&ProjectId) -> Option<Arc<ProjectVersion>>,
    ) -> Result<ProjectVersion, ClassifierError> {
        let mut latest: FxHashMap<&FilePath, &SourceText> = FxHashMap::default();
        for source in compilation.sources() {
            latest.insert(&source.path, source);
        }

        let mut files = im::OrdMap::new();
        let mut pending = Vec::new();
        for source in compilation.sources() {
            let is_latest = latest
                .get(&source.path)
                .is_some_and(|winner| std::ptr::eq(*winner, source));
            if !is_latest {
                continue;
            }
            let reusable = previous
                .and_then(|prev| prev.files.get(&source.path))
                .filter(|file| file.matches(source));
            match reusable {
                Some(file) => {
                    files.insert(source.path.clone(), Arc::clone(file));
                }
                None => pending.push(source),
            }
        }

        let reused = files.len();
        let classified = self.classify_all(&pending)?;
        for file in classified {
            files.insert(file.path.clone(), Arc::new(file));
        }
        tracing::debug!(reused, classified = pending.len(), "files fingerprinted");

        let mut references = BTreeMap::new();
        for reference in compilation.references() {
            if references.contains_key(reference) || reference == compilation.id() {
                continue;
            }
            let resolved = resolve(reference);
            if resolved.is_none() {
                tracing::warn!(reference = %reference, "reference version unavailable");
            }
            references.insert(reference.clone(), resolved);
        }

        Ok(ProjectVersion {
            id: compilation.id().clone(),
            files,
            references,
        })
    }

    fn classify_all(&self, pending: &[&SourceText]) -> Result<Vec<FileVersion>, ClassifierError> {
        if pending.len() > self.options.parallel_threshold {
            pending
                .par_iter()
                .map(|source| self.classify(source))
                .collect()
        } else {
            pending.iter().map(|source| self.classify(source)).collect()
        }
    }

    fn classify(&self, source: &SourceText) -> Result<FileVersion, ClassifierError> {
        let classification = self.engine.classify_file(&source.path, &source.text)?;
        Ok(FileVersion {
            path: source.path.clone(),
            text_hash: text_hash(&source.text),
            declaration_hash: classification.declaration_hash,
            body_hash: classification.body_hash,
            is_compile_time_code: classification.is_compile_time_code,
            partial_types: Arc::new(classification.partial_types),
            text: Arc::clone(&source.text),
        })
    }
}

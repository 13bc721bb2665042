//! File fingerprints.

use std::collections::BTreeSet;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use weave_ir::TypeName;

use crate::config::FingerprintConfig;
use crate::shape::{FileShape, ShapeWalker};

/// Hash of the raw text, trivia included.
///
/// Equal texts always hash equal; used to skip re-fingerprinting unchanged
/// files.
pub fn text_hash(src: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(src.as_bytes());
    hasher.write_usize(src.len());
    hasher.finish()
}

/// Everything the change tracker needs to know about one file's text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fingerprint {
    /// Declaration shape: type headers, member signatures, initialisers.
    pub declaration_hash: u64,
    /// Executable bodies only.
    pub body_hash: u64,
    /// Raw text.
    pub text_hash: u64,
    /// File imports a compile-time namespace or carries a compile-time
    /// attribute.
    pub is_compile_time_code: bool,
    /// Fully-qualified names of the partial types declared in the file.
    pub partial_types: BTreeSet<TypeName>,
    /// Fully-qualified names of every type declared in the file.
    pub declared_types: BTreeSet<TypeName>,
}

/// Computes [`Fingerprint`]s under a [`FingerprintConfig`].
///
/// Stateless apart from its configuration; safe to share across threads.
#[derive(Clone, Debug, Default)]
pub struct Fingerprinter {
    config: FingerprintConfig,
}

impl Fingerprinter {
    /// Fingerprinter with the default compile-time markers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FingerprintConfig) -> Self {
        Fingerprinter { config }
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Fingerprint one file's text. Never fails: malformed text still
    /// produces deterministic hashes.
    pub fn fingerprint(&self, src: &str) -> Fingerprint {
        let walk = ShapeWalker::walk(src);
        let is_compile_time_code = self.is_compile_time_shape(&walk.shape);
        let partial_types = walk
            .shape
            .types
            .iter()
            .filter(|ty| ty.is_partial)
            .map(|ty| ty.name.clone())
            .collect();
        let declared_types = walk.shape.types.iter().map(|ty| ty.name.clone()).collect();

        let fingerprint = Fingerprint {
            declaration_hash: walk.declaration_hash,
            body_hash: walk.body_hash,
            text_hash: text_hash(src),
            is_compile_time_code,
            partial_types,
            declared_types,
        };
        tracing::trace!(
            declaration_hash = fingerprint.declaration_hash,
            body_hash = fingerprint.body_hash,
            is_compile_time_code,
            partial_types = fingerprint.partial_types.len(),
            "fingerprinted"
        );
        fingerprint
    }

    /// Structural facts without hashing concerns.
    pub fn shape(&self, src: &str) -> FileShape {
        ShapeWalker::walk(src).shape
    }

    pub fn partial_types(&self, src: &str) -> BTreeSet<TypeName> {
        self.fingerprint(src).partial_types
    }

    pub fn is_compile_time_code(&self, src: &str) -> bool {
        self.is_compile_time_shape(&ShapeWalker::walk(src).shape)
    }

    fn is_compile_time_shape(&self, shape: &FileShape) -> bool {
        shape
            .usings
            .iter()
            .any(|ns| self.config.is_compile_time_namespace(ns))
            || shape
                .attributes
                .iter()
                .any(|attr| self.config.is_compile_time_attribute(attr))
    }
}

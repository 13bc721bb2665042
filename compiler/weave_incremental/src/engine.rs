//! Boundary to the transformation engine.
//!
//! The incremental engine never parses source itself. It asks a
//! [`TransformationEngine`] to classify each new or edited file and stores
//! the answer in a [`FileVersion`](crate::FileVersion). Dependency edges flow
//! the other way: the engine reports them through a
//! [`DependencyCollector`](crate::DependencyCollector) while it analyses the
//! invalidated files.

use std::collections::BTreeSet;

use weave_fingerprint::Fingerprinter;
use weave_ir::{FilePath, TypeName};

use crate::error::ClassifierError;

/// What the transformation engine reports about one file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub declaration_hash: u64,
    pub body_hash: u64,
    pub is_compile_time_code: bool,
    /// Partial types the file contributes to.
    pub partial_types: BTreeSet<TypeName>,
}

/// Classification capability of the transformation engine.
///
/// Implementations must be deterministic: the same content always yields the
/// same classification.
pub trait TransformationEngine: Send + Sync {
    /// Classify one file.
    ///
    /// An error means the capability itself is unavailable, not that the
    /// file is malformed. Malformed files must still classify.
    ///
    /// Partial-type membership is part of the answer, so one call per file
    /// covers everything the differ later compares.
    fn classify_file(&self, path: &FilePath, content: &str)
        -> Result<Classification, ClassifierError>;
}

impl TransformationEngine for Fingerprinter {
    fn classify_file(
        &self,
        _path: &FilePath,
        content: &str,
    ) -> Result<Classification, ClassifierError> {
        let fingerprint = self.fingerprint(content);
        Ok(Classification {
            declaration_hash: fingerprint.declaration_hash,
            body_hash: fingerprint.body_hash,
            is_compile_time_code: fingerprint.is_compile_time_code,
            partial_types: fingerprint.partial_types,
        })
    }
}

#[cfg(test)]
mod tests;

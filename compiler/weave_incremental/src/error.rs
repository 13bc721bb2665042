//! Error types for the incremental engine.
//!
//! Almost nothing here fails: malformed sources, missing references and
//! first observations all degrade to over-invalidation. The only hard
//! failure is an unavailable classifier, which aborts one snapshot cycle and
//! leaves the previously committed version current.

use weave_ir::ProjectId;

/// The transformation engine could not classify a file.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("classifier unavailable: {message}")]
pub struct ClassifierError {
    message: String,
}

impl ClassifierError {
    pub fn new(message: impl Into<String>) -> Self {
        ClassifierError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`Session`](crate::Session) entry points.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Classification failed; the cycle was abandoned before commit.
    #[error("snapshot of {project} could not be classified: {source}")]
    Classification {
        project: ProjectId,
        source: ClassifierError,
    },

    /// A newer snapshot of the same project arrived before this cycle
    /// committed. Its result was discarded.
    #[error("snapshot of {project} was superseded by a newer snapshot")]
    Superseded { project: ProjectId },

    /// The project has never been observed by this session.
    #[error("unknown project {project}")]
    UnknownProject { project: ProjectId },

    /// The session was shut down.
    #[error("session has been shut down")]
    ShutDown,
}

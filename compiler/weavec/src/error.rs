use std::path::PathBuf;

use weave_incremental::{ClassifierError, SessionError};

/// Failure of a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{line}: malformed dependency `{text}` (expected `dependent -> master`)", path.display())]
    MalformedEdge {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("cannot render report")]
    Render(#[from] std::fmt::Error),
}

impl CommandError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CommandError::Io {
            path: path.into(),
            source,
        }
    }
}

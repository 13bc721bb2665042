//! Pipeline state machine.
//!
//! ```text
//!            pause(causes)                pause(more causes)
//!  Default ─────────────────► Paused ◄──────────────────┐
//!     ▲                         │  └────────────────────┘
//!     │   resume(last cause)    │
//!     └─────────────────────────┘
//! ```
//!
//! A project paused by its own compile-time change lists itself in
//! `paused_by`. There is no terminal state.

use std::collections::BTreeSet;

use weave_ir::ProjectId;

/// Incremental-analysis status of one project.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum PipelineStatus {
    #[default]
    Default,
    Paused { paused_by: BTreeSet<ProjectId> },
}

/// Effect of a status operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// `Default → Paused`.
    Paused,
    /// `Paused → Default`.
    Resumed,
    /// Causes changed, state did not.
    Absorbed,
    /// Nothing changed.
    Unchanged,
}

impl PipelineStatus {
    pub fn is_paused(&self) -> bool {
        matches!(self, PipelineStatus::Paused { .. })
    }

    /// Causes of the pause; empty when not paused.
    pub fn causes(&self) -> BTreeSet<ProjectId> {
        match self {
            PipelineStatus::Default => BTreeSet::new(),
            PipelineStatus::Paused { paused_by } => paused_by.clone(),
        }
    }

    pub fn is_paused_by(&self, cause: &ProjectId) -> bool {
        match self {
            PipelineStatus::Default => false,
            PipelineStatus::Paused { paused_by } => paused_by.contains(cause),
        }
    }

    /// Pause because of `causes`. Pausing an already paused project only
    /// records the new causes.
    pub fn pause(&mut self, causes: impl IntoIterator<Item = ProjectId>) -> Transition {
        let mut causes = causes.into_iter().peekable();
        if causes.peek().is_none() {
            return Transition::Unchanged;
        }
        match self {
            PipelineStatus::Default => {
                *self = PipelineStatus::Paused {
                    paused_by: causes.collect(),
                };
                Transition::Paused
            }
            PipelineStatus::Paused { paused_by } => {
                let before = paused_by.len();
                paused_by.extend(causes);
                if paused_by.len() == before {
                    Transition::Unchanged
                } else {
                    Transition::Absorbed
                }
            }
        }
    }

    /// Withdraw one cause. The project resumes once no cause is left.
    pub fn resume(&mut self, cause: &ProjectId) -> Transition {
        let PipelineStatus::Paused { paused_by } = self else {
            return Transition::Unchanged;
        };
        if !paused_by.remove(cause) {
            return Transition::Unchanged;
        }
        if paused_by.is_empty() {
            *self = PipelineStatus::Default;
            Transition::Resumed
        } else {
            Transition::Absorbed
        }
    }

    /// Drop every cause.
    pub fn resume_all(&mut self) -> Transition {
        if self.is_paused() {
            *self = PipelineStatus::Default;
            Transition::Resumed
        } else {
            Transition::Unchanged
        }
    }
}

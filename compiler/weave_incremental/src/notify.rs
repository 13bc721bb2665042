//! Outbound notifications.
//!
//! State changes are published as messages on crossbeam channels, one
//! message per transition. Subscribers consume them on their own threads,
//! so no callback ever runs while a project slot is locked.

use std::collections::BTreeSet;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use weave_ir::ProjectId;

/// A state change of one project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    /// The project committed a new version; cached analysis is stale.
    DirtyProject { project: ProjectId },
    /// The project entered the paused state.
    PipelinePaused {
        project: ProjectId,
        causes: BTreeSet<ProjectId>,
    },
    /// The project left the paused state.
    PipelineResumed { project: ProjectId },
}

impl Notification {
    pub fn project(&self) -> &ProjectId {
        match self {
            Notification::DirtyProject { project }
            | Notification::PipelinePaused { project, .. }
            | Notification::PipelineResumed { project } => project,
        }
    }
}

/// Fan-out of notifications to every live subscriber.
#[derive(Debug, Default)]
pub(crate) struct Notifier {
    subscribers: Mutex<Vec<Sender<Notification>>>,
}

impl Notifier {
    pub(crate) fn subscribe(&self) -> Receiver<Notification> {
        let (sender, receiver) = channel::unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Send to every subscriber, forgetting those that hung up.
    pub(crate) fn emit(&self, notification: &Notification) {
        tracing::trace!(?notification, "notify");
        self.subscribers
            .lock()
            .retain(|sender| sender.send(notification.clone()).is_ok());
    }

    /// Disconnect every subscriber.
    pub(crate) fn close(&self) {
        self.subscribers.lock().clear();
    }
}

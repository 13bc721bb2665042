//! Incremental change tracking for aspect analysis.
//!
//! Every observed compilation becomes an immutable [`ProjectVersion`]. Two
//! versions diff into [`CompilationChanges`]; changes plus the
//! [`DependencyGraph`] recorded by the last analysis give the set of files
//! to re-analyse. A compile-time change pauses the pipeline instead.
//!
//! # Architecture
//!
//! ```text
//! Compilation ──► VersionBuilder ──► ProjectVersion ─┐
//!                  (fingerprints,       (persistent)   │ diff
//!                   reused by text)                   ▼
//!                                          CompilationChanges
//!                                                      │ invalidate
//!                       DependencyGraph ──────────────►│
//!                        (persistent)                  ▼
//!                                    Invalidation { files, removed, paused_by }
//!                                                      │
//!                                          Session ────┴──► PipelineStatus
//!                                             │              Notification
//!                                             ▼
//!                                    record_analysis(edges)
//! ```
//!
//! [`Session`] owns the per-project state and runs the cycle; the other
//! modules are pure functions over immutable values and can be used on
//! their own.

mod config;
mod diff;
mod engine;
mod error;
mod graph;
mod invalidate;
mod notify;
mod pipeline;
mod session;
mod version;

pub use config::{BuildOptions, DiffOptions, SessionConfig};
pub use diff::{
    diff, CompilationChanges, CompileTimeTransition, FileChange, FileChangeKind,
    PartialTypeChange, PartialTypeChangeKind, ReferenceChanges,
};
pub use engine::{Classification, TransformationEngine};
pub use error::{ClassifierError, SessionError};
pub use graph::{DependencyCollector, DependencyGraph, MasterProjectDependencies};
pub use invalidate::{invalidate, invalidate_projects, Invalidation, ProjectChanges};
pub use notify::Notification;
pub use pipeline::{PipelineStatus, Transition};
pub use session::{AnalysisPlan, Session, SnapshotOutcome};
pub use version::{Compilation, FileVersion, ProjectVersion, SourceText, VersionBuilder};

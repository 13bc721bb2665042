//! Analysis session: the owner of every project's current state.
//!
//! One [`Session`] lives for the lifetime of an analysis host. It replaces
//! ambient global caches with an explicit context: per project it keeps the
//! latest compilation, the committed [`ProjectVersion`], the committed
//! [`DependencyGraph`] and the [`PipelineStatus`].
//!
//! # Cycle
//!
//! ```text
//! on_new_snapshot(c)
//!   │ lock slot ── same snapshot in flight? ──► wait for its result
//!   │           ── paused? ──► Paused { last_known_good }
//!   │           generation += 1, register in-flight cycle
//!   │ unlock
//!   ▼
//! build version ─► diff ─► invalidate          (no lock held)
//!   │
//!   │ lock slot ── generation moved on? ──► Superseded
//!   │           ── compile-time change? ──► pause, keep last known good
//!   │           commit version (pointer swap)
//!   │ unlock
//!   ▼
//! notify, propagate pause to dependents (one slot locked at a time)
//! ```
//!
//! Versions and graphs are immutable; readers clone the `Arc` under the slot
//! lock and never block a cycle in progress.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use weave_ir::{FilePath, ProjectId};

use crate::config::SessionConfig;
use crate::diff::{diff, CompilationChanges};
use crate::engine::TransformationEngine;
use crate::error::SessionError;
use crate::graph::{DependencyCollector, DependencyGraph};
use crate::invalidate::{invalidate, Invalidation};
use crate::notify::{Notification, Notifier};
use crate::pipeline::{PipelineStatus, Transition};
use crate::version::{Compilation, ProjectVersion, VersionBuilder};

// ─── Outcomes ────────────────────────────────────────────────────

/// Work the host must do after a committed snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnalysisPlan {
    pub project: ProjectId,
    pub version: Arc<ProjectVersion>,
    pub changes: Arc<CompilationChanges>,
    pub invalidation: Invalidation,
}

impl AnalysisPlan {
    /// Files to re-analyse. Report their edges through
    /// [`Session::record_analysis`] afterwards.
    pub fn files(&self) -> &BTreeSet<FilePath> {
        &self.invalidation.files
    }
}

/// Result of [`Session::on_new_snapshot`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SnapshotOutcome {
    Analyzed(AnalysisPlan),
    /// Incremental analysis is suspended. The host keeps serving
    /// `last_known_good` until the project is resumed.
    Paused {
        causes: BTreeSet<ProjectId>,
        last_known_good: Option<Arc<ProjectVersion>>,
        /// Changes that caused the pause, when this snapshot caused it.
        changes: Option<Arc<CompilationChanges>>,
    },
}

impl SnapshotOutcome {
    pub fn is_paused(&self) -> bool {
        matches!(self, SnapshotOutcome::Paused { .. })
    }

    pub fn plan(&self) -> Option<&AnalysisPlan> {
        match self {
            SnapshotOutcome::Analyzed(plan) => Some(plan),
            SnapshotOutcome::Paused { .. } => None,
        }
    }
}

type CycleResult = Result<SnapshotOutcome, SessionError>;

// ─── Project State ───────────────────────────────────────────────

/// A cycle other requests for the same snapshot can wait on.
struct InFlight {
    snapshot_key: u64,
    result: Mutex<Option<CycleResult>>,
    ready: Condvar,
    waiters: AtomicUsize,
}

impl InFlight {
    fn new(snapshot_key: u64) -> Self {
        InFlight {
            snapshot_key,
            result: Mutex::new(None),
            ready: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    fn wait(&self) -> CycleResult {
        self.waiters.fetch_add(1, Ordering::SeqCst);
        let mut result = self.result.lock();
        loop {
            if let Some(result) = result.as_ref() {
                return result.clone();
            }
            self.ready.wait(&mut result);
        }
    }

    fn complete(&self, result: CycleResult) {
        *self.result.lock() = Some(result);
        let waiters = self.waiters.load(Ordering::SeqCst);
        tracing::trace!(waiters, "cycle complete");
        self.ready.notify_all();
    }
}

#[derive(Default)]
struct ProjectState {
    compilation: Option<Arc<Compilation>>,
    version: Option<Arc<ProjectVersion>>,
    graph: Arc<DependencyGraph>,
    status: PipelineStatus,
    /// Bumped by every snapshot and re-baseline; a cycle commits only if the
    /// generation it started with is still current.
    generation: u64,
    in_flight: Option<Arc<InFlight>>,
}

#[derive(Default)]
struct ProjectSlot {
    state: Mutex<ProjectState>,
}

/// Version, changes and invalidation computed outside the slot lock.
struct Computed {
    version: Arc<ProjectVersion>,
    changes: Arc<CompilationChanges>,
    invalidation: Invalidation,
}

enum CycleOutput {
    Computed(Computed),
    /// An upstream project is paused.
    Inherited(BTreeSet<ProjectId>),
}

// ─── Session ─────────────────────────────────────────────────────

/// Per-host registry of projects and their incremental state.
pub struct Session {
    engine: Arc<dyn TransformationEngine>,
    config: SessionConfig,
    projects: RwLock<FxHashMap<ProjectId, Arc<ProjectSlot>>>,
    notifier: Notifier,
    shut_down: AtomicBool,
}

impl Session {
    pub fn new(engine: Arc<dyn TransformationEngine>) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    pub fn with_config(engine: Arc<dyn TransformationEngine>, config: SessionConfig) -> Self {
        Session {
            engine,
            config,
            projects: RwLock::new(FxHashMap::default()),
            notifier: Notifier::default(),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receive every notification emitted from now on.
    pub fn subscribe(&self) -> crossbeam::channel::Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ─── Inbound ─────────────────────────────────────────────────

    /// Observe a new compilation of a project.
    ///
    /// Identical snapshots arriving while one is in flight share its result.
    /// A newer snapshot supersedes an older in-flight one, which then
    /// returns [`SessionError::Superseded`].
    #[tracing::instrument(level = "debug", skip_all, fields(project = %compilation.id()))]
    pub fn on_new_snapshot(&self, compilation: Compilation) -> Result<SnapshotOutcome, SessionError> {
        self.ensure_running()?;
        let project = compilation.id().clone();
        let compilation = Arc::new(compilation);
        let slot = self.slot_or_insert(&project);

        let (cycle, generation, previous, graph) = {
            let mut state = slot.state.lock();
            let coalesce = state
                .in_flight
                .as_ref()
                .filter(|cycle| cycle.snapshot_key == compilation.snapshot_key())
                .map(Arc::clone);
            if let Some(cycle) = coalesce {
                drop(state);
                tracing::debug!("joining in-flight cycle");
                return cycle.wait();
            }

            state.generation += 1;
            state.compilation = Some(Arc::clone(&compilation));
            if state.status.is_paused() {
                tracing::debug!("paused: serving last known good version");
                return Ok(SnapshotOutcome::Paused {
                    causes: state.status.causes(),
                    last_known_good: state.version.clone(),
                    changes: None,
                });
            }

            let cycle = Arc::new(InFlight::new(compilation.snapshot_key()));
            state.in_flight = Some(Arc::clone(&cycle));
            (
                cycle,
                state.generation,
                state.version.clone(),
                Arc::clone(&state.graph),
            )
        };

        let inherited = self.upstream_pauses(&project, compilation.references());
        let output = if inherited.is_empty() {
            self.compute(&compilation, previous, &graph)
                .map(CycleOutput::Computed)
        } else {
            Ok(CycleOutput::Inherited(inherited))
        };

        let mut notes = Vec::new();
        let mut propagate = BTreeSet::new();
        let outcome = {
            let mut state = slot.state.lock();
            if state
                .in_flight
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &cycle))
            {
                state.in_flight = None;
            }
            if state.generation == generation {
                Self::commit(&project, &mut state, output, &mut notes, &mut propagate)
            } else {
                tracing::debug!("superseded before commit");
                Err(SessionError::Superseded {
                    project: project.clone(),
                })
            }
        };
        cycle.complete(outcome.clone());

        for note in &notes {
            self.notifier.emit(note);
        }
        if !propagate.is_empty() {
            self.propagate_pause(&project, &propagate);
        }
        outcome
    }

    /// Leave the paused state after an external full build.
    ///
    /// Re-baselines `project` from its latest compilation, then clears every
    /// cause on it and withdraws `project` as a cause from every other
    /// project, re-baselining those that resume. If the re-baseline of
    /// `project` fails nothing changes: it stays paused, its dependents stay
    /// paused, and a later `resume` can retry. Returns the plan of the
    /// re-baselined project, if it has a compilation.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resume(&self, project: &ProjectId) -> Result<Option<AnalysisPlan>, SessionError> {
        self.ensure_running()?;
        let slot = self.slot(project).ok_or_else(|| SessionError::UnknownProject {
            project: project.clone(),
        })?;

        let plan = self.rebaseline(project, &slot)?;
        if slot.state.lock().status.resume_all() == Transition::Resumed {
            self.notifier.emit(&Notification::PipelineResumed {
                project: project.clone(),
            });
        }
        if plan.is_some() {
            self.notifier.emit(&Notification::DirtyProject {
                project: project.clone(),
            });
        }

        for (id, other) in self.slots() {
            if &id == project {
                continue;
            }
            let sole_cause = {
                let state = other.state.lock();
                state.status.is_paused_by(project) && state.status.causes().len() == 1
            };
            // A failed re-baseline still withdraws the cause.
            let rebaselined = if sole_cause {
                match self.rebaseline(&id, &other) {
                    Ok(plan) => plan.is_some(),
                    Err(err) => {
                        tracing::warn!(project = %id, %err, "re-baseline after resume failed");
                        false
                    }
                }
            } else {
                false
            };
            if other.state.lock().status.resume(project) == Transition::Resumed {
                self.notifier
                    .emit(&Notification::PipelineResumed { project: id.clone() });
            }
            if rebaselined {
                self.notifier
                    .emit(&Notification::DirtyProject { project: id.clone() });
            }
        }
        Ok(plan)
    }

    /// Record the dependency edges found while analysing `analyzed`.
    ///
    /// Replaces the edges of exactly those files and swaps the graph pointer.
    pub fn record_analysis(
        &self,
        project: &ProjectId,
        analyzed: &BTreeSet<FilePath>,
        collector: &DependencyCollector,
    ) -> Result<Arc<DependencyGraph>, SessionError> {
        self.ensure_running()?;
        let slot = self.slot(project).ok_or_else(|| SessionError::UnknownProject {
            project: project.clone(),
        })?;
        let mut state = slot.state.lock();
        let graph = Arc::new(state.graph.update(analyzed, collector));
        state.graph = Arc::clone(&graph);
        Ok(graph)
    }

    // ─── Queries ─────────────────────────────────────────────────

    pub fn status(&self, project: &ProjectId) -> Option<PipelineStatus> {
        Some(self.slot(project)?.state.lock().status.clone())
    }

    /// Last committed (known-good) version.
    pub fn current_version(&self, project: &ProjectId) -> Option<Arc<ProjectVersion>> {
        self.slot(project)?.state.lock().version.clone()
    }

    pub fn current_graph(&self, project: &ProjectId) -> Option<Arc<DependencyGraph>> {
        Some(Arc::clone(&self.slot(project)?.state.lock().graph))
    }

    /// Latest compilation observed, committed or not.
    pub fn latest_compilation(&self, project: &ProjectId) -> Option<Arc<Compilation>> {
        self.slot(project)?.state.lock().compilation.clone()
    }

    /// Every known project, sorted.
    pub fn projects(&self) -> Vec<ProjectId> {
        let mut ids: Vec<ProjectId> = self.projects.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Tear the session down. Later calls fail with
    /// [`SessionError::ShutDown`]; subscribers are disconnected.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let slots = std::mem::take(&mut *self.projects.write());
        tracing::debug!(projects = slots.len(), "session shut down");
        self.notifier.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    // ─── Internals ───────────────────────────────────────────────

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.is_shut_down() {
            Err(SessionError::ShutDown)
        } else {
            Ok(())
        }
    }

    fn slot(&self, project: &ProjectId) -> Option<Arc<ProjectSlot>> {
        self.projects.read().get(project).cloned()
    }

    fn slot_or_insert(&self, project: &ProjectId) -> Arc<ProjectSlot> {
        if let Some(slot) = self.slot(project) {
            return slot;
        }
        Arc::clone(self.projects.write().entry(project.clone()).or_default())
    }

    /// Snapshot of every slot, taken so no registry lock is held while a
    /// slot is locked.
    fn slots(&self) -> Vec<(ProjectId, Arc<ProjectSlot>)> {
        let mut slots: Vec<_> = self
            .projects
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));
        slots
    }

    fn builder(&self) -> VersionBuilder<'_> {
        VersionBuilder::new(self.engine.as_ref()).with_options(self.config.build)
    }

    fn compute(
        &self,
        compilation: &Compilation,
        previous: Option<Arc<ProjectVersion>>,
        graph: &DependencyGraph,
    ) -> Result<Computed, SessionError> {
        let mut visiting = FxHashSet::default();
        visiting.insert(compilation.id().clone());
        let version = self
            .builder()
            .build(previous.as_deref(), compilation, &mut |id| {
                self.reference_version(id, &mut visiting)
            })
            .map_err(|source| SessionError::Classification {
                project: compilation.id().clone(),
                source,
            })?;
        let version = Arc::new(version);
        let changes = Arc::new(diff(previous.as_ref(), &version, self.config.diff));
        let invalidation = invalidate(graph, &changes);
        Ok(Computed {
            version,
            changes,
            invalidation,
        })
    }

    /// Apply a cycle's output under the slot lock.
    fn commit(
        project: &ProjectId,
        state: &mut ProjectState,
        output: Result<CycleOutput, SessionError>,
        notes: &mut Vec<Notification>,
        propagate: &mut BTreeSet<ProjectId>,
    ) -> CycleResult {
        match output? {
            CycleOutput::Inherited(causes) => {
                tracing::debug!(?causes, "upstream project paused");
                if state.status.pause(causes) == Transition::Paused {
                    notes.push(Notification::PipelinePaused {
                        project: project.clone(),
                        causes: state.status.causes(),
                    });
                }
                Ok(SnapshotOutcome::Paused {
                    causes: state.status.causes(),
                    last_known_good: state.version.clone(),
                    changes: None,
                })
            }
            CycleOutput::Computed(computed) if computed.invalidation.requires_pause() => {
                let causes = computed.invalidation.paused_by.clone();
                tracing::debug!(?causes, "compile-time change: pausing");
                if state.status.pause(causes.iter().cloned()) == Transition::Paused {
                    notes.push(Notification::PipelinePaused {
                        project: project.clone(),
                        causes: state.status.causes(),
                    });
                }
                propagate.extend(causes);
                Ok(SnapshotOutcome::Paused {
                    causes: state.status.causes(),
                    last_known_good: state.version.clone(),
                    changes: Some(computed.changes),
                })
            }
            CycleOutput::Computed(computed) => {
                let plan = Self::commit_version(project, state, computed);
                if !plan.changes.is_empty() {
                    notes.push(Notification::DirtyProject {
                        project: project.clone(),
                    });
                }
                Ok(SnapshotOutcome::Analyzed(plan))
            }
        }
    }

    fn commit_version(
        project: &ProjectId,
        state: &mut ProjectState,
        computed: Computed,
    ) -> AnalysisPlan {
        state.version = Some(Arc::clone(&computed.version));
        if !computed.invalidation.removed.is_empty() {
            let pruned = state
                .graph
                .update(&computed.invalidation.removed, &DependencyCollector::new());
            state.graph = Arc::new(pruned);
        }
        tracing::debug!(
            files = computed.invalidation.files.len(),
            removed = computed.invalidation.removed.len(),
            "committed"
        );
        AnalysisPlan {
            project: project.clone(),
            version: computed.version,
            changes: computed.changes,
            invalidation: computed.invalidation,
        }
    }

    /// Rebuild `project` from its latest compilation and commit the result
    /// regardless of compile-time changes.
    ///
    /// Leaves the pipeline status alone; on error the committed version and
    /// graph are untouched.
    fn rebaseline(
        &self,
        project: &ProjectId,
        slot: &ProjectSlot,
    ) -> Result<Option<AnalysisPlan>, SessionError> {
        let (compilation, previous, graph, generation) = {
            let mut state = slot.state.lock();
            let Some(compilation) = state.compilation.clone() else {
                return Ok(None);
            };
            state.generation += 1;
            (
                compilation,
                state.version.clone(),
                Arc::clone(&state.graph),
                state.generation,
            )
        };

        let computed = self.compute(&compilation, previous, &graph)?;

        let plan = {
            let mut state = slot.state.lock();
            if state.generation != generation {
                tracing::debug!(project = %project, "re-baseline superseded");
                return Ok(None);
            }
            Self::commit_version(project, &mut state, computed)
        };
        Ok(Some(plan))
    }

    /// Current version of a referenced project.
    ///
    /// A project observed but never committed gets a full baseline built
    /// from its latest compilation. `visiting` holds the projects being
    /// built on the current path; revisiting one means a reference cycle,
    /// which is reported as missing.
    fn reference_version(
        &self,
        project: &ProjectId,
        visiting: &mut FxHashSet<ProjectId>,
    ) -> Option<Arc<ProjectVersion>> {
        if visiting.contains(project) {
            tracing::warn!(project = %project, "reference cycle");
            return None;
        }
        let slot = self.slot(project)?;
        let compilation = {
            let state = slot.state.lock();
            if let Some(version) = &state.version {
                return Some(Arc::clone(version));
            }
            state.compilation.clone()?
        };

        visiting.insert(project.clone());
        let built = self
            .builder()
            .build(None, &compilation, &mut |id| self.reference_version(id, visiting));
        visiting.remove(project);

        match built {
            Ok(version) => Some(Arc::new(version)),
            Err(err) => {
                tracing::warn!(project = %project, %err, "baseline of reference failed");
                None
            }
        }
    }

    /// Root causes of every paused project upstream of `project`.
    fn upstream_pauses(&self, project: &ProjectId, references: &[ProjectId]) -> BTreeSet<ProjectId> {
        let mut causes = BTreeSet::new();
        let mut seen: FxHashSet<ProjectId> = FxHashSet::default();
        seen.insert(project.clone());
        let mut queue: Vec<ProjectId> = references.to_vec();
        while let Some(id) = queue.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(slot) = self.slot(&id) else {
                continue;
            };
            let state = slot.state.lock();
            causes.extend(state.status.causes());
            if let Some(compilation) = &state.compilation {
                queue.extend(compilation.references().iter().cloned());
            }
        }
        causes
    }

    /// Every project that references `origin`, directly or transitively.
    fn transitive_dependents(&self, origin: &ProjectId) -> Vec<(ProjectId, Arc<ProjectSlot>)> {
        let slots = self.slots();
        let mut referenced_by: FxHashMap<ProjectId, Vec<usize>> = FxHashMap::default();
        for (index, (_, slot)) in slots.iter().enumerate() {
            let references = slot
                .state
                .lock()
                .compilation
                .as_ref()
                .map(|c| c.references().to_vec())
                .unwrap_or_default();
            for reference in references {
                referenced_by.entry(reference).or_default().push(index);
            }
        }

        let mut seen = FxHashSet::default();
        seen.insert(origin.clone());
        let mut queue = vec![origin.clone()];
        let mut dependents = Vec::new();
        while let Some(id) = queue.pop() {
            for &index in referenced_by.get(&id).map_or(&[][..], Vec::as_slice) {
                let (dependent, slot) = &slots[index];
                if seen.insert(dependent.clone()) {
                    queue.push(dependent.clone());
                    dependents.push((dependent.clone(), Arc::clone(slot)));
                }
            }
        }
        dependents
    }

    /// Pause every transitive dependent of `origin` with `causes`.
    fn propagate_pause(&self, origin: &ProjectId, causes: &BTreeSet<ProjectId>) {
        for (id, slot) in self.transitive_dependents(origin) {
            let note = {
                let mut state = slot.state.lock();
                if state.status.pause(causes.iter().cloned()) == Transition::Paused {
                    state.generation += 1;
                    Some(Notification::PipelinePaused {
                        project: id.clone(),
                        causes: state.status.causes(),
                    })
                } else {
                    None
                }
            };
            if let Some(note) = note {
                tracing::debug!(project = %id, "paused by upstream");
                self.notifier.emit(&note);
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("projects", &self.projects())
            .field("config", &self.config)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

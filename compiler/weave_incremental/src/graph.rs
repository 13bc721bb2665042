//! Persistent dependency graph.
//!
//! Records, per master project, which dependent files rely on which master
//! files and master types. A reverse index (dependent → masters) lets
//! [`DependencyGraph::update`] drop a dependent's stale edges without
//! scanning the whole graph.
//!
//! ```text
//! projects: OrdMap<ProjectId, Arc<MasterProjectDependencies>>
//!               │
//!               ├── by_file: OrdMap<FilePath, Arc<BTreeSet<FilePath>>>
//!               └── by_type: OrdMap<TypeName, Arc<BTreeSet<FilePath>>>
//!
//! reverse:  OrdMap<FilePath, Arc<BTreeSet<(ProjectId, MasterKey)>>>
//! ```
//!
//! Every level is shared between graph versions. `update` clones the root
//! maps in O(1) and copies only the entries it touches, so every untouched
//! master project and dependent set stays pointer-equal to the previous
//! graph.

use std::collections::BTreeSet;
use std::sync::Arc;

use weave_ir::{DependencyEdge, FilePath, MasterKey, ProjectId, TypeName};

type Dependents = Arc<BTreeSet<FilePath>>;

/// Dependents of the masters of one project.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MasterProjectDependencies {
    by_file: im::OrdMap<FilePath, Dependents>,
    by_type: im::OrdMap<TypeName, Dependents>,
}

impl MasterProjectDependencies {
    pub fn file_dependents(&self, master: &FilePath) -> Option<&Dependents> {
        self.by_file.get(master)
    }

    pub fn type_dependents(&self, master: &TypeName) -> Option<&Dependents> {
        self.by_type.get(master)
    }

    pub fn dependents(&self, master: &MasterKey) -> Option<&Dependents> {
        match master {
            MasterKey::File(path) => self.file_dependents(path),
            MasterKey::Type(name) => self.type_dependents(name),
        }
    }

    /// Every file depending on anything in this project.
    pub fn all_dependents(&self) -> BTreeSet<FilePath> {
        self.by_file
            .values()
            .chain(self.by_type.values())
            .flat_map(|set| set.iter().cloned())
            .collect()
    }

    pub fn file_masters(&self) -> impl Iterator<Item = &FilePath> {
        self.by_file.keys()
    }

    pub fn type_masters(&self) -> impl Iterator<Item = &TypeName> {
        self.by_type.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty() && self.by_type.is_empty()
    }

    fn insert(&mut self, master: &MasterKey, dependent: FilePath) -> bool {
        let slot = match master {
            MasterKey::File(path) => self.by_file.entry(path.clone()).or_default(),
            MasterKey::Type(name) => self.by_type.entry(name.clone()).or_default(),
        };
        if slot.contains(&dependent) {
            return false;
        }
        Arc::make_mut(slot).insert(dependent)
    }

    /// Remove one edge, pruning the master entry once it has no dependents.
    fn remove(&mut self, master: &MasterKey, dependent: &FilePath) {
        match master {
            MasterKey::File(path) => remove_from(&mut self.by_file, path, dependent),
            MasterKey::Type(name) => remove_from(&mut self.by_type, name, dependent),
        }
    }
}

fn remove_from<K: Ord + Clone>(map: &mut im::OrdMap<K, Dependents>, key: &K, dependent: &FilePath) {
    let Some(set) = map.get(key) else {
        return;
    };
    if !set.contains(dependent) {
        return;
    }
    if set.len() == 1 {
        map.remove(key);
        return;
    }
    if let Some(set) = map.get_mut(key) {
        Arc::make_mut(set).remove(dependent);
    }
}

/// Dependency graph of one dependent project.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyGraph {
    projects: im::OrdMap<ProjectId, Arc<MasterProjectDependencies>>,
    reverse: im::OrdMap<FilePath, Arc<BTreeSet<(ProjectId, MasterKey)>>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` relies on `master` in `master_project`.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_dependency(
        &mut self,
        dependent: FilePath,
        master_project: ProjectId,
        master: MasterKey,
    ) -> bool {
        let project = self.projects.entry(master_project.clone()).or_default();
        if project
            .dependents(&master)
            .is_some_and(|set| set.contains(&dependent))
        {
            return false;
        }
        Arc::make_mut(project).insert(&master, dependent.clone());
        let masters = self.reverse.entry(dependent).or_default();
        Arc::make_mut(masters).insert((master_project, master));
        true
    }

    pub fn add_edge(&mut self, edge: &DependencyEdge) -> bool {
        self.add_dependency(
            edge.dependent.clone(),
            edge.master_project.clone(),
            edge.master.clone(),
        )
    }

    /// Replace every edge of `dependents` with the edges `collector`
    /// gathered for them.
    ///
    /// Dependents outside the set keep their edges untouched, and collector
    /// edges of files outside the set are ignored. A dependent with no prior
    /// edges is not an error.
    #[tracing::instrument(level = "debug", skip_all, fields(dependents = dependents.len()))]
    #[must_use]
    pub fn update(
        &self,
        dependents: &BTreeSet<FilePath>,
        collector: &DependencyCollector,
    ) -> DependencyGraph {
        let mut graph = self.clone();
        for dependent in dependents {
            graph.remove_dependent(dependent);
        }
        let mut added = 0usize;
        for edge in collector.edges() {
            if dependents.contains(&edge.dependent) && graph.add_edge(edge) {
                added += 1;
            }
        }
        tracing::debug!(added, edges = graph.edge_count(), "graph updated");
        graph
    }

    /// Drop every edge of `dependent`.
    pub fn remove_dependent(&mut self, dependent: &FilePath) {
        let Some(masters) = self.reverse.remove(dependent) else {
            return;
        };
        for (project_id, master) in masters.iter() {
            let Some(project) = self.projects.get_mut(project_id) else {
                continue;
            };
            Arc::make_mut(project).remove(master, dependent);
            if project.is_empty() {
                self.projects.remove(project_id);
            }
        }
    }

    /// Dependents of one master. Empty if nothing depends on it.
    pub fn enumerate_dependents(
        &self,
        master_project: &ProjectId,
        master: &MasterKey,
    ) -> BTreeSet<FilePath> {
        self.dependents(master_project, master)
            .map(|set| set.as_ref().clone())
            .unwrap_or_default()
    }

    /// Shared dependent set of one master, if any.
    pub fn dependents(&self, master_project: &ProjectId, master: &MasterKey) -> Option<&Dependents> {
        self.projects.get(master_project)?.dependents(master)
    }

    /// Every file depending on anything in `master_project`.
    pub fn all_dependents(&self, master_project: &ProjectId) -> BTreeSet<FilePath> {
        self.projects
            .get(master_project)
            .map(|project| project.all_dependents())
            .unwrap_or_default()
    }

    pub fn project(&self, master_project: &ProjectId) -> Option<&Arc<MasterProjectDependencies>> {
        self.projects.get(master_project)
    }

    pub fn master_projects(&self) -> impl Iterator<Item = &ProjectId> {
        self.projects.keys()
    }

    /// Files with at least one edge.
    pub fn dependent_files(&self) -> impl Iterator<Item = &FilePath> {
        self.reverse.keys()
    }

    /// Masters one dependent relies on.
    pub fn masters_of(&self, dependent: &FilePath) -> Option<&Arc<BTreeSet<(ProjectId, MasterKey)>>> {
        self.reverse.get(dependent)
    }

    /// Every edge, ordered by dependent.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.reverse.iter().flat_map(|(dependent, masters)| {
            masters.iter().map(move |(project, master)| {
                DependencyEdge::new(dependent.clone(), project.clone(), master.clone())
            })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.reverse.values().map(|masters| masters.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

impl FromIterator<DependencyEdge> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = DependencyEdge>>(iter: I) -> Self {
        let mut graph = DependencyGraph::new();
        for edge in iter {
            graph.add_edge(&edge);
        }
        graph
    }
}

/// Edges reported by the transformation engine while analysing files.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyCollector {
    edges: BTreeSet<DependencyEdge>,
}

impl DependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, edge: DependencyEdge) -> bool {
        self.edges.insert(edge)
    }

    pub fn add_dependency(
        &mut self,
        dependent: impl Into<FilePath>,
        master_project: ProjectId,
        master: MasterKey,
    ) -> bool {
        self.add(DependencyEdge::new(dependent.into(), master_project, master))
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    /// Edges reported for one dependent.
    pub fn edges_of<'a>(&'a self, dependent: &'a FilePath) -> impl Iterator<Item = &'a DependencyEdge> {
        self.edges.iter().filter(move |edge| &edge.dependent == dependent)
    }

    pub fn dependents(&self) -> BTreeSet<FilePath> {
        self.edges.iter().map(|edge| edge.dependent.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Extend<DependencyEdge> for DependencyCollector {
    fn extend<I: IntoIterator<Item = DependencyEdge>>(&mut self, iter: I) {
        self.edges.extend(iter);
    }
}

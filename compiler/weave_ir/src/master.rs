//! Units of dependency.
//!
//! A *master* is something a dependent file's analysis relied on. Either a
//! whole file, or a logical type whose declaration may be spread over several
//! files (a partial type). Depending on the type rather than on the first file
//! found means a change to *any* contributing file reaches the dependent.

use std::fmt;

use crate::{FilePath, ProjectId, TypeName};

/// The target of a dependency edge.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MasterKey {
    /// Everything declared in one file.
    File(FilePath),
    /// The merged declaration of a (possibly partial) type.
    Type(TypeName),
}

impl MasterKey {
    /// Shorthand for `MasterKey::File`.
    pub fn file(path: impl Into<FilePath>) -> Self {
        MasterKey::File(path.into())
    }

    /// Shorthand for `MasterKey::Type`.
    pub fn ty(name: impl Into<TypeName>) -> Self {
        MasterKey::Type(name.into())
    }
}

impl fmt::Display for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterKey::File(path) => write!(f, "file:{path}"),
            MasterKey::Type(name) => write!(f, "type:{name}"),
        }
    }
}

/// One recorded reliance of `dependent` on `master` inside `master_project`.
///
/// Produced while (re-)analyzing `dependent`; the engine only stores and
/// queries edges.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DependencyEdge {
    pub dependent: FilePath,
    pub master_project: ProjectId,
    pub master: MasterKey,
}

impl DependencyEdge {
    /// Create a new edge.
    pub fn new(dependent: FilePath, master_project: ProjectId, master: MasterKey) -> Self {
        DependencyEdge {
            dependent,
            master_project,
            master,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} in {}",
            self.dependent, self.master, self.master_project
        )
    }
}

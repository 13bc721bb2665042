//! Project identity.

use std::fmt;
use std::sync::Arc;

/// Identity of one compiled unit (a "project").
///
/// A name plus a version marker that does not depend on the project's
/// content (an assembly version, a build configuration tag). Two ids are
/// equal iff they denote the same logical project.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectId {
    name: Arc<str>,
    marker: Arc<str>,
}

impl ProjectId {
    /// Marker used by [`ProjectId::named`].
    pub const DEFAULT_MARKER: &'static str = "0.0.0";

    /// Create an id from a name and a version marker.
    pub fn new(name: impl AsRef<str>, marker: impl AsRef<str>) -> Self {
        ProjectId {
            name: Arc::from(name.as_ref()),
            marker: Arc::from(marker.as_ref()),
        }
    }

    /// Create an id with the default version marker.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::new(name, Self::DEFAULT_MARKER)
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version marker.
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl fmt::Debug for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectId({self})")
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.marker)
    }
}

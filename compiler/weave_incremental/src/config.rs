//! Engine configuration.

/// Options for [`VersionBuilder`](crate::VersionBuilder).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BuildOptions {
    /// Classify files on the rayon pool once more than this many files need
    /// (re)classification in one build.
    pub parallel_threshold: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            parallel_threshold: 32,
        }
    }
}

impl BuildOptions {
    /// Never classify in parallel.
    pub fn sequential() -> Self {
        BuildOptions {
            parallel_threshold: usize::MAX,
        }
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Options for [`diff`](crate::diff).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DiffOptions {
    /// Also report `Unchanged` files in `syntax_tree_changes`.
    pub include_unchanged: bool,
}

impl DiffOptions {
    /// Report every file, changed or not.
    pub fn full_listing() -> Self {
        DiffOptions {
            include_unchanged: true,
        }
    }

    #[must_use]
    pub fn with_include_unchanged(mut self, include: bool) -> Self {
        self.include_unchanged = include;
        self
    }
}

/// Configuration of a [`Session`](crate::Session).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionConfig {
    pub build: BuildOptions,
    pub diff: DiffOptions,
}

impl SessionConfig {
    #[must_use]
    pub fn with_build(mut self, build: BuildOptions) -> Self {
        self.build = build;
        self
    }

    #[must_use]
    pub fn with_diff(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }
}

//! Compile-time marker configuration.

/// Which constructs mark a file as compile-time code.
///
/// A file is compile-time code when it imports a marker namespace (or one of
/// its children) or carries a marker attribute anywhere in a declaration
/// header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FingerprintConfig {
    /// Namespaces whose import marks a file (`using Aspects;`,
    /// `using Aspects.Advice;`).
    pub compile_time_namespaces: Vec<String>,
    /// Attribute names, without the `Attribute` suffix.
    pub compile_time_attributes: Vec<String>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        FingerprintConfig {
            compile_time_namespaces: vec!["Aspects".to_string()],
            compile_time_attributes: vec![
                "CompileTime".to_string(),
                "RunTimeOrCompileTime".to_string(),
            ],
        }
    }
}

impl FingerprintConfig {
    /// Config with no markers at all: nothing is compile-time code.
    pub fn empty() -> Self {
        FingerprintConfig {
            compile_time_namespaces: Vec::new(),
            compile_time_attributes: Vec::new(),
        }
    }

    /// Add a marker namespace.
    #[must_use]
    pub fn with_compile_time_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.compile_time_namespaces.push(namespace.into());
        self
    }

    /// Add a marker attribute.
    #[must_use]
    pub fn with_compile_time_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.compile_time_attributes.push(attribute.into());
        self
    }

    /// `true` if importing `namespace` marks a file.
    pub fn is_compile_time_namespace(&self, namespace: &str) -> bool {
        let namespace = namespace.strip_prefix("global::").unwrap_or(namespace);
        self.compile_time_namespaces.iter().any(|marker| {
            namespace == marker
                || namespace
                    .strip_prefix(marker.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// `true` if an attribute spelled `name` marks a file.
    ///
    /// Accepts both `CompileTime` and `CompileTimeAttribute`.
    pub fn is_compile_time_attribute(&self, name: &str) -> bool {
        let name = name.strip_suffix("Attribute").unwrap_or(name);
        self.compile_time_attributes.iter().any(|marker| marker == name)
    }
}

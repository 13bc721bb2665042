//! Shared string identifiers.
//!
//! `FilePath` names one source file inside a project (project-relative, `/`
//! separated). `TypeName` names a logical type by its fully-qualified name.
//! Both wrap an `Arc<str>` so they can be stored in many sets at once.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

macro_rules! shared_str_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create from anything string-like.
            pub fn new(value: impl AsRef<str>) -> Self {
                $name(Arc::from(value.as_ref()))
            }

            /// Borrow the underlying string.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(Arc::from(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

shared_str_newtype! {
    /// Project-relative path of a source file.
    ///
    /// Backslashes are normalised to `/` by [`FilePath::normalized`]; plain
    /// [`FilePath::new`] keeps the text as given.
    FilePath
}

shared_str_newtype! {
    /// Fully-qualified name of a logical type (`Ns.Outer.Inner`).
    TypeName
}

impl FilePath {
    /// Create a path with `\` separators rewritten to `/`.
    pub fn normalized(value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if value.contains('\\') {
            FilePath::from(value.replace('\\', "/"))
        } else {
            FilePath::new(value)
        }
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

//! Weave Fingerprint - Declaration-Shape Hashing
//!
//! Turns the text of one source file into a [`Fingerprint`]: a hash of its
//! declaration shape, a separate hash of its executable bodies, a flag telling
//! whether the file is compile-time code, and the partial types it
//! contributes to.
//!
//! # Architecture
//!
//! ```text
//! source ──► tokenize() ──► ShapeWalker ──────────┬──► declaration hash
//!                                                   ├──► body hash
//!                                                   └──► FileShape (types, usings, attributes)
//!                                                              │
//!                                    FingerprintConfig ───────►┴──► is_compile_time_code
//! ```
//!
//! Whitespace and comments never reach the hashers, so editing them leaves
//! every hash unchanged. Preprocessor directives are the exception: they can
//! change what compiles, so they feed the declaration hash. Method, accessor and expression bodies feed only the
//! body hash: editing a statement never changes the declaration hash, which is
//! what makes per-keystroke reanalysis cheap.

mod config;
mod fingerprint;
mod shape;

pub use config::FingerprintConfig;
pub use fingerprint::{text_hash, Fingerprint, Fingerprinter};
pub use shape::{DeclaredType, FileShape, TypeKind};

//! Weave IR - Shared Identities
//!
//! This crate contains the small, cheaply-cloned identity types every other
//! weave crate agrees on:
//! - `ProjectId` for one compiled unit
//! - `FilePath` and `TypeName` for the things dependencies point at
//! - `MasterKey` and `DependencyEdge` for the dependency graph
//!
//! # Design Philosophy
//!
//! - **Share Everything**: strings are `Arc<str>`, so clones never allocate
//! - **Order Everything**: every identity is `Ord`, so sets and maps built from
//!   them iterate deterministically (reports and tests depend on it)
//!
//! With the `cache` feature every type also derives serde traits.

mod master;
mod name;
mod project_id;

pub use master::{DependencyEdge, MasterKey};
pub use name::{FilePath, TypeName};
pub use project_id::ProjectId;

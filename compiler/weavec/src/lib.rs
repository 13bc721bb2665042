//! Weave command-line support.
//!
//! Loads directories of sources as project snapshots and renders what the
//! incremental engine makes of them. The `weave` binary is a thin argument
//! parser over [`commands`].

pub mod commands;
mod error;
mod project;

use std::sync::Once;

pub use error::CommandError;
pub use project::{load_project, parse_edges, SOURCE_EXTENSION};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=weave_incremental=debug`
/// or `RUST_LOG=trace`; spans are rendered as an indented tree on stderr.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tree)
                .init();
        }
    });
}

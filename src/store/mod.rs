//! Persistence of the primary graph file.
//!
//! The store is a seam: operations only depend on the [`ProjectStore`]
//! trait, with the JSON-backed implementation as the default. A project
//! document is a directory holding the graph file plus the scheme side-file
//! collections (which are handled by [`crate::scheme`], not here).

pub mod json;
pub mod lock;

use std::path::Path;

use anyhow::Result;

use crate::core::project::ProjectGraph;

pub use json::JsonStore;

/// Name of the primary graph file inside a project document directory.
pub const GRAPH_FILE: &str = "graph.json";

/// Loads and saves the primary graph file of a project document.
pub trait ProjectStore {
    /// Load the graph from a project document directory. Fails with
    /// [`GraphError::ProjectNotFound`](crate::core::error::GraphError) if the
    /// graph file is absent, and with a generic error if it is malformed.
    fn load(&self, document: &Path) -> Result<ProjectGraph>;

    /// Persist the graph, overwriting the primary graph file. Entities not
    /// touched by the current operation round-trip unchanged.
    fn save(&self, graph: &ProjectGraph, document: &Path) -> Result<()>;
}

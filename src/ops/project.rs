//! Creation of new project documents.

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::project::ProjectGraph;
use crate::ops::Report;
use crate::store::{lock, JsonStore, ProjectStore, GRAPH_FILE};

/// Create an empty project document at `document` with the standard
/// configuration skeleton. Fails if a graph file already exists there.
pub fn new_project(document: &Path, name: &str) -> Result<Report> {
    let handle = lock::document_lock(document);
    let _guard = lock::acquire(&handle);

    if document.join(GRAPH_FILE).exists() {
        bail!("project document already exists: {}", document.display());
    }

    let graph = ProjectGraph::new(name);
    JsonStore.save(&graph, document)?;
    tracing::info!(name, path = %document.display(), "created project document");

    Ok(Report::new()
        .with("created", true)
        .with("name", name)
        .with("path", document.display().to_string()))
}

//! JSON-backed project store.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::error::GraphError;
use crate::core::project::ProjectGraph;
use crate::store::{ProjectStore, GRAPH_FILE};
use crate::util::fs;

/// Serializes the graph as pretty-printed JSON with stable key order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl ProjectStore for JsonStore {
    fn load(&self, document: &Path) -> Result<ProjectGraph> {
        let graph_path = document.join(GRAPH_FILE);
        if !graph_path.is_file() {
            return Err(GraphError::ProjectNotFound {
                path: document.to_path_buf(),
            }
            .into());
        }
        let contents = fs::read_to_string(&graph_path)?;
        let graph: ProjectGraph = serde_json::from_str(&contents)
            .with_context(|| format!("malformed project document: {}", graph_path.display()))?;
        Ok(graph)
    }

    fn save(&self, graph: &ProjectGraph, document: &Path) -> Result<()> {
        let graph_path = document.join(GRAPH_FILE);
        let mut contents = serde_json::to_string_pretty(graph)
            .context("failed to serialize project graph")?;
        contents.push('\n');
        fs::write_string(&graph_path, &contents)
    }
}

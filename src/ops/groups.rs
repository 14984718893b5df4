//! Group tree operations.

use std::path::Path;

use anyhow::Result;

use crate::ops::{read_graph, with_graph, Report};

/// Create a group (or nested chain of groups) under an optional parent
/// path. The parent must already exist; the new components are created.
pub fn add_group(document: &Path, name: &str, parent: Option<&str>) -> Result<Report> {
    with_graph(document, |graph| {
        if let Some(parent) = parent {
            // Resolve the parent strictly so a typo surfaces as GroupNotFound
            // instead of silently creating the whole chain.
            graph.group_mut(parent, false)?;
        }

        let full_path = match parent {
            Some(parent) if !parent.is_empty() => format!("{}/{}", parent, name),
            _ => name.to_string(),
        };
        let group = graph.group_mut(&full_path, true)?;
        let group_name = group.name.clone();

        tracing::debug!(path = full_path, "added group");
        Ok(Report::new().with("group", group_name).with("path", full_path))
    })
}

/// List every group path in the document, depth-first.
pub fn list_groups(document: &Path) -> Result<Report> {
    read_graph(document, |graph| {
        let paths: Vec<String> = graph.groups().into_iter().map(|(path, _)| path).collect();
        Ok(Report::new().with("count", paths.len()).with("groups", paths))
    })
}

/// Remove a group subtree by path, cascading build-file joins for every
/// file reference underneath it.
pub fn remove_group(document: &Path, path: &str) -> Result<Report> {
    with_graph(document, |graph| {
        let cascaded = graph.remove_group_cascade(path)?;
        tracing::debug!(path, cascaded, "removed group");
        Ok(Report::new()
            .with("removed", path)
            .with("build_files_removed", cascaded))
    })
}

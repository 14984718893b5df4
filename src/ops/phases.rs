//! Build phase operations.

use std::path::Path;

use anyhow::{bail, Result};

use crate::core::phase::{BuildPhase, CopyFilesPhase, FilesPhase, ScriptPhase};
use crate::ops::{read_graph, with_graph, Report};

/// Options for appending a build phase to a target.
#[derive(Debug, Clone)]
pub struct AddBuildPhaseOptions {
    pub target: String,

    /// Phase kind token: sources, resources, frameworks, headers,
    /// copyfiles, or script.
    pub kind: String,

    /// Display name (script and copy-files phases).
    pub name: Option<String>,

    /// Shell for script phases; defaults to /bin/sh.
    pub shell: Option<String>,

    /// Script text for script phases.
    pub script: Option<String>,
}

/// Append a new build phase to a target.
pub fn add_build_phase(document: &Path, opts: &AddBuildPhaseOptions) -> Result<Report> {
    with_graph(document, |graph| {
        let id = graph.alloc_id();
        let phase = match opts.kind.to_lowercase().as_str() {
            "sources" => BuildPhase::Sources(FilesPhase::new(id)),
            "resources" => BuildPhase::Resources(FilesPhase::new(id)),
            "frameworks" => BuildPhase::Frameworks(FilesPhase::new(id)),
            "headers" => BuildPhase::Headers(FilesPhase::new(id)),
            "copyfiles" | "copy-files" => BuildPhase::CopyFiles(CopyFilesPhase {
                id,
                name: opts.name.clone(),
                files: Vec::new(),
            }),
            "script" | "run-script" => BuildPhase::Script(ScriptPhase {
                id,
                name: opts.name.clone().unwrap_or_else(|| "Run Script".to_string()),
                shell_path: opts.shell.clone().unwrap_or_else(|| "/bin/sh".to_string()),
                script: opts.script.clone().unwrap_or_default(),
                files: Vec::new(),
            }),
            other => bail!("unknown build phase kind `{}`", other),
        };

        let kind = phase.kind_name();
        let name = phase.display_name().to_string();
        let target = graph.target_mut(&opts.target)?;
        target.phases.push(phase);

        tracing::debug!(target = opts.target, kind, "added build phase");
        Ok(Report::new()
            .with("kind", kind)
            .with("name", name)
            .with("target", opts.target.clone()))
    })
}

/// List a target's build phases, in order.
pub fn list_build_phases(document: &Path, target: &str) -> Result<Report> {
    read_graph(document, |graph| {
        let target = graph.target(target)?;
        let phases: Vec<serde_json::Value> = target
            .phases
            .iter()
            .map(|phase| {
                serde_json::json!({
                    "kind": phase.kind_name(),
                    "name": phase.display_name(),
                    "files": phase.files().len(),
                })
            })
            .collect();
        Ok(Report::new()
            .with("count", phases.len())
            .with("phases", phases)
            .with("target", target.name.clone()))
    })
}

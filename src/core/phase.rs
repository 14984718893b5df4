//! Build phases and build-file join records.
//!
//! A build phase is a tagged sum type; every per-kind access goes through an
//! exhaustive match rather than a runtime type test.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::GraphError;
use crate::core::project::{next_object_id, ObjectId};

/// The join record attaching one file reference to one build phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildFile {
    pub id: ObjectId,

    /// Id of the referenced [`FileReference`](crate::core::group::FileReference).
    pub file_ref: ObjectId,

    /// Optional per-file settings (e.g. compiler flags).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl BuildFile {
    pub fn new(id: ObjectId, file_ref: ObjectId) -> Self {
        BuildFile {
            id,
            file_ref,
            settings: BTreeMap::new(),
        }
    }
}

/// Payload shared by the plain phase kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesPhase {
    pub id: ObjectId,

    #[serde(default)]
    pub files: Vec<BuildFile>,
}

impl FilesPhase {
    pub fn new(id: ObjectId) -> Self {
        FilesPhase {
            id,
            files: Vec::new(),
        }
    }
}

/// A copy-files phase with an optional display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyFilesPhase {
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub files: Vec<BuildFile>,
}

/// A shell-script phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPhase {
    pub id: ObjectId,
    pub name: String,
    pub shell_path: String,
    pub script: String,

    #[serde(default)]
    pub files: Vec<BuildFile>,
}

/// An ordered build step on a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BuildPhase {
    Sources(FilesPhase),
    Resources(FilesPhase),
    Frameworks(FilesPhase),
    Headers(FilesPhase),
    CopyFiles(CopyFilesPhase),
    Script(ScriptPhase),
}

impl BuildPhase {
    /// Kind token used in reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BuildPhase::Sources(_) => "sources",
            BuildPhase::Resources(_) => "resources",
            BuildPhase::Frameworks(_) => "frameworks",
            BuildPhase::Headers(_) => "headers",
            BuildPhase::CopyFiles(_) => "copyfiles",
            BuildPhase::Script(_) => "script",
        }
    }

    /// Display name: the script or copy-files name where one exists,
    /// otherwise the kind token.
    pub fn display_name(&self) -> &str {
        match self {
            BuildPhase::Script(p) => &p.name,
            BuildPhase::CopyFiles(p) => p.name.as_deref().unwrap_or("copyfiles"),
            other => other.kind_name(),
        }
    }

    pub fn files(&self) -> &[BuildFile] {
        match self {
            BuildPhase::Sources(p)
            | BuildPhase::Resources(p)
            | BuildPhase::Frameworks(p)
            | BuildPhase::Headers(p) => &p.files,
            BuildPhase::CopyFiles(p) => &p.files,
            BuildPhase::Script(p) => &p.files,
        }
    }

    pub fn files_mut(&mut self) -> &mut Vec<BuildFile> {
        match self {
            BuildPhase::Sources(p)
            | BuildPhase::Resources(p)
            | BuildPhase::Frameworks(p)
            | BuildPhase::Headers(p) => &mut p.files,
            BuildPhase::CopyFiles(p) => &mut p.files,
            BuildPhase::Script(p) => &mut p.files,
        }
    }
}

/// Automatic phase membership classes for added files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseClass {
    Sources,
    Resources,
}

/// Classify a file extension into its automatic phase, if any.
///
/// Compilable sources go to the sources phase, bundle content to resources;
/// everything else gets no automatic membership.
pub fn class_for_extension(ext: &str) -> Option<PhaseClass> {
    match ext.to_lowercase().as_str() {
        "swift" | "m" | "mm" | "c" | "cpp" | "cc" => Some(PhaseClass::Sources),
        "xib" | "storyboard" | "xcassets" | "json" | "plist" => Some(PhaseClass::Resources),
        _ => None,
    }
}

/// Resolve a phase-type token against a target's phase list.
///
/// The keyword table is case-insensitive; any unrecognized token falls back
/// to an exact match against shell-script phase names. Only the sources
/// phase is created on demand.
pub fn resolve_phase<'a>(
    phases: &'a mut Vec<BuildPhase>,
    token: &str,
    next_id: &mut u64,
) -> Result<&'a mut BuildPhase, GraphError> {
    let idx = match token.to_lowercase().as_str() {
        "sources" | "compile" => {
            match phases.iter().position(|p| matches!(p, BuildPhase::Sources(_))) {
                Some(idx) => Some(idx),
                None => {
                    let id = next_object_id(next_id);
                    phases.push(BuildPhase::Sources(FilesPhase::new(id)));
                    Some(phases.len() - 1)
                }
            }
        }
        "resources" => phases.iter().position(|p| matches!(p, BuildPhase::Resources(_))),
        "frameworks" | "link" => {
            phases.iter().position(|p| matches!(p, BuildPhase::Frameworks(_)))
        }
        "headers" => phases.iter().position(|p| matches!(p, BuildPhase::Headers(_))),
        "copybundles" | "embedframeworks" => {
            phases.iter().position(|p| matches!(p, BuildPhase::CopyFiles(_)))
        }
        _ => phases
            .iter()
            .position(|p| matches!(p, BuildPhase::Script(s) if s.name == token)),
    };

    match idx {
        Some(idx) => Ok(&mut phases[idx]),
        None => Err(GraphError::ConfigurationNotFound {
            message: format!("Build phase not found: {}", token),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases() -> (Vec<BuildPhase>, u64) {
        let phases = vec![
            BuildPhase::Sources(FilesPhase::new("OBJ-00000001".to_string())),
            BuildPhase::Frameworks(FilesPhase::new("OBJ-00000002".to_string())),
            BuildPhase::Resources(FilesPhase::new("OBJ-00000003".to_string())),
            BuildPhase::Script(ScriptPhase {
                id: "OBJ-00000004".to_string(),
                name: "Lint".to_string(),
                shell_path: "/bin/sh".to_string(),
                script: "swiftlint".to_string(),
                files: Vec::new(),
            }),
        ];
        (phases, 4)
    }

    #[test]
    fn test_keyword_table_is_case_insensitive() {
        let (mut phases, mut next) = phases();
        let phase = resolve_phase(&mut phases, "COMPILE", &mut next).unwrap();
        assert_eq!(phase.kind_name(), "sources");
        let phase = resolve_phase(&mut phases, "Link", &mut next).unwrap();
        assert_eq!(phase.kind_name(), "frameworks");
    }

    #[test]
    fn test_sources_phase_created_on_demand() {
        let mut phases = Vec::new();
        let mut next = 0;
        let phase = resolve_phase(&mut phases, "sources", &mut next).unwrap();
        assert_eq!(phase.kind_name(), "sources");
        assert_eq!(phases.len(), 1);
    }

    #[test]
    fn test_script_phase_name_fallback_is_exact() {
        let (mut phases, mut next) = phases();
        assert!(resolve_phase(&mut phases, "Lint", &mut next).is_ok());
        let err = resolve_phase(&mut phases, "lint", &mut next).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationNotFound");
        assert_eq!(err.to_string(), "Build phase not found: lint");
    }

    #[test]
    fn test_extension_classes() {
        assert_eq!(class_for_extension("swift"), Some(PhaseClass::Sources));
        assert_eq!(class_for_extension("MM"), Some(PhaseClass::Sources));
        assert_eq!(class_for_extension("storyboard"), Some(PhaseClass::Resources));
        assert_eq!(class_for_extension("md"), None);
    }
}

//! Central error taxonomy for structural operations.
//!
//! Every precondition check in the graph, store, and scheme layers raises one
//! of these kinds, carrying the offending identifier. Underlying storage
//! failures (malformed documents, missing directories) are not mapped here;
//! they propagate as generic errors with context.

use std::path::PathBuf;

use thiserror::Error;

/// A structural error raised by a project-graph operation.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("project document not found: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("target not found: `{name}`")]
    TargetNotFound { name: String },

    #[error("group not found: `{path}`")]
    GroupNotFound { path: String },

    #[error("{message}")]
    ConfigurationNotFound { message: String },

    #[error("file not found: `{path}`")]
    FileNotFound { path: String },

    #[error("path is a directory: {}", path.display())]
    PathIsDirectory { path: PathBuf },

    #[error("path is not a directory: {}", path.display())]
    PathIsNotDirectory { path: PathBuf },

    #[error("`{path}` is already covered by folder reference `{folder}`")]
    FileAlreadyCoveredByFolderReference { path: String, folder: String },

    #[error("folder reference already exists at `{path}`")]
    FolderReferenceAlreadyExists { path: String },

    #[error("scheme not found: `{name}`")]
    SchemeNotFound { name: String },

    #[error("scheme already exists: `{name}`")]
    SchemeAlreadyExists { name: String },

    #[error("invalid action type: `{token}`")]
    InvalidActionType { token: String },
}

impl GraphError {
    /// Stable machine-readable kind token, used for structured error output.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphError::ProjectNotFound { .. } => "ProjectNotFound",
            GraphError::TargetNotFound { .. } => "TargetNotFound",
            GraphError::GroupNotFound { .. } => "GroupNotFound",
            GraphError::ConfigurationNotFound { .. } => "ConfigurationNotFound",
            GraphError::FileNotFound { .. } => "FileNotFound",
            GraphError::PathIsDirectory { .. } => "PathIsDirectory",
            GraphError::PathIsNotDirectory { .. } => "PathIsNotDirectory",
            GraphError::FileAlreadyCoveredByFolderReference { .. } => {
                "FileAlreadyCoveredByFolderReference"
            }
            GraphError::FolderReferenceAlreadyExists { .. } => "FolderReferenceAlreadyExists",
            GraphError::SchemeNotFound { .. } => "SchemeNotFound",
            GraphError::SchemeAlreadyExists { .. } => "SchemeAlreadyExists",
            GraphError::InvalidActionType { .. } => "InvalidActionType",
        }
    }

    /// Shorthand for the missing-build-configuration case.
    pub fn configuration_not_found(name: &str) -> Self {
        GraphError::ConfigurationNotFound {
            message: format!("build configuration not found: `{}`", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tokens_are_stable() {
        let err = GraphError::TargetNotFound {
            name: "App".to_string(),
        };
        assert_eq!(err.kind(), "TargetNotFound");
        assert_eq!(err.to_string(), "target not found: `App`");
    }

    #[test]
    fn test_coverage_error_names_both_paths() {
        let err = GraphError::FileAlreadyCoveredByFolderReference {
            path: "Sources/Feature/File.swift".to_string(),
            folder: "Sources/Feature".to_string(),
        };
        assert!(err.to_string().contains("Sources/Feature/File.swift"));
        assert!(err.to_string().contains("folder reference"));
    }
}

//! File reference lifecycle: add, remove, folder references.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::error::GraphError;
use crate::core::group::{FileReference, GroupChild, SyncedFolder};
use crate::core::phase::{self, BuildFile, PhaseClass};
use crate::ops::{read_graph, source_root, with_graph, Report};
use crate::util::fs;

/// Options for adding a file reference.
#[derive(Debug, Clone, Default)]
pub struct AddFileOptions {
    /// File path, relative to the project source root (or absolute).
    pub path: String,

    /// Slash-separated group path to place the reference under; missing
    /// components are created. Empty/absent means the root group.
    pub group: Option<String>,

    /// Target whose build phases receive the file, classified by extension.
    pub target: Option<String>,
}

/// Resolve a caller-supplied path against the project source root, returning
/// `(absolute, project_relative)`.
fn resolve_paths(document: &Path, raw: &str) -> (PathBuf, String) {
    let root = source_root(document);
    let raw_path = Path::new(raw);
    let absolute = if raw_path.is_absolute() {
        raw_path.to_path_buf()
    } else {
        root.join(raw_path)
    };
    let relative = fs::relative_path(root, &absolute)
        .to_string_lossy()
        .into_owned();
    (absolute, relative)
}

/// Add a file reference, optionally registering it with a target's build
/// phase chosen by extension.
pub fn add_file(document: &Path, opts: &AddFileOptions) -> Result<Report> {
    let (absolute, relative) = resolve_paths(document, &opts.path);

    with_graph(document, |graph| {
        if absolute.is_dir() {
            return Err(GraphError::PathIsDirectory { path: absolute.clone() }.into());
        }

        // Folder-reference coverage: explicit file references may not live
        // under a synced folder's subtree.
        if let Some(folder) = graph.covering_folder(&relative) {
            return Err(GraphError::FileAlreadyCoveredByFolderReference {
                path: relative.clone(),
                folder: folder.path.clone(),
            }
            .into());
        }

        let file_id = graph.alloc_id();
        let file = FileReference::new(file_id.clone(), relative.clone());
        let file_name = file.name.clone();
        let extension = file.file_type.clone();

        let group_path = opts.group.as_deref().unwrap_or("");
        let group = graph.group_mut(group_path, true)?;
        group.children.push(GroupChild::File(file));

        let mut report = Report::new()
            .with("file", file_name)
            .with("path", relative.clone());

        if let Some(target_name) = &opts.target {
            let class = extension.as_deref().and_then(phase::class_for_extension);
            if let Some(class) = class {
                let build_file_id = graph.alloc_id();
                let mut next_id = graph.next_id;
                let target = graph.target_mut(target_name)?;
                let token = match class {
                    PhaseClass::Sources => "sources",
                    PhaseClass::Resources => "resources",
                };
                let phase = phase::resolve_phase(&mut target.phases, token, &mut next_id)?;
                phase.files_mut().push(BuildFile::new(build_file_id, file_id));
                graph.next_id = next_id;
                report.set("phase", token);
                report.set("target", target_name);
            } else {
                // Still validate the target name so a typo fails loudly.
                graph.target(target_name)?;
                report.set("phase", serde_json::Value::Null);
                report.set("target", target_name);
            }
        }

        tracing::debug!(path = relative, "added file reference");
        Ok(report)
    })
}

/// Remove a file reference by exact path-or-name match (first match in
/// insertion order), cascading its build files across all phases of all
/// targets, and optionally deleting the underlying disk file.
pub fn remove_file(document: &Path, key: &str, remove_from_disk: bool) -> Result<Report> {
    let root = source_root(document).to_path_buf();
    with_graph(document, |graph| {
        let (removed, cascaded) =
            graph
                .remove_file_cascade(key)
                .ok_or_else(|| GraphError::FileNotFound {
                    path: key.to_string(),
                })?;

        let mut deleted_from_disk = false;
        if remove_from_disk {
            deleted_from_disk = fs::remove_file_if_exists(&root.join(&removed.path))?;
        }

        tracing::debug!(path = removed.path, cascaded, "removed file reference");
        Ok(Report::new()
            .with("removed", removed.path)
            .with("build_files_removed", cascaded)
            .with("deleted_from_disk", deleted_from_disk))
    })
}

/// Add a folder reference (synced folder) under a parent group, optionally
/// registering it on a target.
pub fn add_folder_reference(
    document: &Path,
    folder: &str,
    group: Option<&str>,
    target: Option<&str>,
) -> Result<Report> {
    let (absolute, relative) = resolve_paths(document, folder);

    with_graph(document, |graph| {
        if !absolute.is_dir() {
            return Err(GraphError::PathIsNotDirectory { path: absolute.clone() }.into());
        }
        if graph.synced_folders().iter().any(|f| f.path == relative) {
            return Err(GraphError::FolderReferenceAlreadyExists {
                path: relative.clone(),
            }
            .into());
        }

        let folder_id = graph.alloc_id();
        let synced = SyncedFolder::new(folder_id.clone(), relative.clone());
        let folder_name = synced.name.clone();

        let group_path = group.unwrap_or("");
        let parent = graph.group_mut(group_path, true)?;
        parent.children.push(GroupChild::Folder(synced));

        if let Some(target_name) = target {
            graph.target_mut(target_name)?.synced_folders.push(folder_id);
        }

        tracing::debug!(path = relative, "added folder reference");
        Ok(Report::new()
            .with("folder", folder_name)
            .with("path", relative.clone()))
    })
}

/// List file references: all of them, or only those attached to a target's
/// build phases.
pub fn list_files(document: &Path, target: Option<&str>) -> Result<Report> {
    read_graph(document, |graph| {
        let files: Vec<serde_json::Value> = match target {
            Some(name) => {
                let target = graph.target(name)?;
                let mut out = Vec::new();
                for phase in &target.phases {
                    for build_file in phase.files() {
                        if let Some(file) = graph.file_by_id(&build_file.file_ref) {
                            out.push(serde_json::json!({
                                "name": file.name,
                                "path": file.path,
                                "phase": phase.kind_name(),
                            }));
                        }
                    }
                }
                out
            }
            None => {
                let mut refs = Vec::new();
                graph.main_group.collect_files(&mut refs);
                refs.into_iter()
                    .map(|f| serde_json::json!({ "name": f.name, "path": f.path }))
                    .collect()
            }
        };
        Ok(Report::new().with("count", files.len()).with("files", files))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add_target, new_project, AddTargetOptions};
    use serde_json::json;
    use tempfile::TempDir;

    fn project_with_target() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("Demo.xcgraph");
        new_project(&doc, "Demo").unwrap();
        add_target(
            &doc,
            &AddTargetOptions {
                name: "App".to_string(),
                product_type: "app".to_string(),
                bundle_id: None,
            },
        )
        .unwrap();
        (tmp, doc)
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "// generated by test").unwrap();
    }

    #[test]
    fn test_add_source_file_joins_sources_phase() {
        let (tmp, doc) = project_with_target();
        touch(tmp.path(), "Sources/App.swift");

        let report = add_file(
            &doc,
            &AddFileOptions {
                path: "Sources/App.swift".to_string(),
                group: Some("Sources".to_string()),
                target: Some("App".to_string()),
            },
        )
        .unwrap();
        assert_eq!(report.get("phase"), Some(&json!("sources")));

        let listed = list_files(&doc, Some("App")).unwrap();
        assert_eq!(listed.get("count"), Some(&json!(1)));
    }

    #[test]
    fn test_add_resource_file_joins_resources_phase() {
        let (tmp, doc) = project_with_target();
        touch(tmp.path(), "Resources/Main.storyboard");

        let report = add_file(
            &doc,
            &AddFileOptions {
                path: "Resources/Main.storyboard".to_string(),
                group: None,
                target: Some("App".to_string()),
            },
        )
        .unwrap();
        assert_eq!(report.get("phase"), Some(&json!("resources")));
    }

    #[test]
    fn test_unclassified_extension_gets_no_phase() {
        let (tmp, doc) = project_with_target();
        touch(tmp.path(), "README.md");

        let report = add_file(
            &doc,
            &AddFileOptions {
                path: "README.md".to_string(),
                group: None,
                target: Some("App".to_string()),
            },
        )
        .unwrap();
        assert_eq!(report.get("phase"), Some(&json!(null)));
        let listed = list_files(&doc, Some("App")).unwrap();
        assert_eq!(listed.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_add_file_rejects_directory() {
        let (tmp, doc) = project_with_target();
        std::fs::create_dir_all(tmp.path().join("Sources")).unwrap();

        let err = add_file(
            &doc,
            &AddFileOptions {
                path: "Sources".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("PathIsDirectory"));
    }

    #[test]
    fn test_folder_reference_rejects_file() {
        let (tmp, doc) = project_with_target();
        touch(tmp.path(), "notes.txt");

        let err = add_folder_reference(&doc, "notes.txt", None, None).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("PathIsNotDirectory"));
    }

    #[test]
    fn test_folder_reference_coverage_conflict() {
        let (tmp, doc) = project_with_target();
        std::fs::create_dir_all(tmp.path().join("Sources/Feature")).unwrap();
        touch(tmp.path(), "Sources/Feature/View.swift");

        add_folder_reference(&doc, "Sources/Feature", None, Some("App")).unwrap();

        let err = add_file(
            &doc,
            &AddFileOptions {
                path: "Sources/Feature/View.swift".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
        match err.downcast_ref::<GraphError>() {
            Some(GraphError::FileAlreadyCoveredByFolderReference { path, folder }) => {
                assert_eq!(path, "Sources/Feature/View.swift");
                assert_eq!(folder, "Sources/Feature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_folder_reference() {
        let (tmp, doc) = project_with_target();
        std::fs::create_dir_all(tmp.path().join("Vendor")).unwrap();

        add_folder_reference(&doc, "Vendor", None, None).unwrap();
        let err = add_folder_reference(&doc, "Vendor", None, None).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("FolderReferenceAlreadyExists"));
    }

    #[test]
    fn test_remove_file_cascades_and_deletes() {
        let (tmp, doc) = project_with_target();
        touch(tmp.path(), "Sources/App.swift");
        add_file(
            &doc,
            &AddFileOptions {
                path: "Sources/App.swift".to_string(),
                group: Some("Sources".to_string()),
                target: Some("App".to_string()),
            },
        )
        .unwrap();

        let report = remove_file(&doc, "App.swift", true).unwrap();
        assert_eq!(report.get("build_files_removed"), Some(&json!(1)));
        assert_eq!(report.get("deleted_from_disk"), Some(&json!(true)));
        assert!(!tmp.path().join("Sources/App.swift").exists());

        let listed = list_files(&doc, None).unwrap();
        assert_eq!(listed.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_remove_missing_file() {
        let (_tmp, doc) = project_with_target();
        let err = remove_file(&doc, "Ghost.swift", false).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("FileNotFound"));
    }

    #[test]
    fn test_failed_add_leaves_document_untouched() {
        let (tmp, doc) = project_with_target();
        std::fs::create_dir_all(tmp.path().join("Sources")).unwrap();
        let before = std::fs::read(doc.join("graph.json")).unwrap();

        let _ = add_file(
            &doc,
            &AddFileOptions {
                path: "Sources".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();

        let after = std::fs::read(doc.join("graph.json")).unwrap();
        assert_eq!(before, after);
    }
}

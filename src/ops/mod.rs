//! High-level operations.
//!
//! One function per exposed operation. Every operation is stateless across
//! calls: it takes the document path, acquires the document's single-writer
//! lock, loads the graph fresh, navigates and mutates in memory, and
//! persists only on success. A failure anywhere before the final persist
//! leaves storage untouched. Read-only operations take the same exclusive
//! path and simply skip the persist step.

pub mod files;
pub mod groups;
pub mod packages;
pub mod phases;
pub mod project;
pub mod report;
pub mod schemes;
pub mod settings;
pub mod targets;

use std::path::Path;

use anyhow::Result;

use crate::core::project::ProjectGraph;
use crate::store::{lock, JsonStore, ProjectStore};

pub use files::{add_file, add_folder_reference, list_files, remove_file, AddFileOptions};
pub use groups::{add_group, list_groups, remove_group};
pub use packages::{add_local_package, add_remote_package, list_packages, RemotePackageOptions};
pub use phases::{add_build_phase, list_build_phases, AddBuildPhaseOptions};
pub use project::new_project;
pub use report::Report;
pub use schemes::{
    add_scheme_action, add_scheme_testable, create_scheme, delete_scheme, get_scheme_info,
    list_schemes, set_scheme_arguments, set_scheme_coverage, set_scheme_environment,
    update_scheme, CreateSchemeOptions, SchemeActionOptions, UpdateSchemeOptions,
};
pub use settings::{get_build_settings, list_configurations, update_build_setting};
pub use targets::{
    add_target, add_target_dependency, get_target_info, list_targets, remove_target,
    AddTargetOptions,
};

/// Run a mutating operation: load, mutate, persist on success only.
pub(crate) fn with_graph<T>(
    document: &Path,
    f: impl FnOnce(&mut ProjectGraph) -> Result<T>,
) -> Result<T> {
    let handle = lock::document_lock(document);
    let _guard = lock::acquire(&handle);

    let store = JsonStore;
    let mut graph = store.load(document)?;
    let out = f(&mut graph)?;
    store.save(&graph, document)?;
    Ok(out)
}

/// Run a read-only operation: load, inspect, no persist.
pub(crate) fn read_graph<T>(
    document: &Path,
    f: impl FnOnce(&ProjectGraph) -> Result<T>,
) -> Result<T> {
    let handle = lock::document_lock(document);
    let _guard = lock::acquire(&handle);

    let graph = JsonStore.load(document)?;
    f(&graph)
}

/// The project source root: files and local packages are addressed relative
/// to the directory containing the project document.
pub(crate) fn source_root(document: &Path) -> &Path {
    document.parent().unwrap_or(Path::new("."))
}

/// The container token embedded in proxies and buildable references.
pub(crate) fn container_name(document: &Path) -> String {
    let name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    format!("container:{}", name)
}

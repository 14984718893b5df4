//! The project graph root and its lookup index.
//!
//! All identities are stable string ids allocated from a counter persisted in
//! the graph itself, so reload-per-call keeps ids stable across operations.

use serde::{Deserialize, Serialize};

use crate::core::config::ConfigurationList;
use crate::core::error::GraphError;
use crate::core::group::{resolve_group_mut, FileReference, Group, SyncedFolder};
use crate::core::package::PackageReference;
use crate::core::target::Target;

/// Stable identifier of an object within one persisted graph.
pub type ObjectId = String;

/// Allocate the next object id from the persisted counter.
pub fn next_object_id(counter: &mut u64) -> ObjectId {
    *counter += 1;
    format!("OBJ-{:08}", *counter)
}

/// The root of a loaded project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectGraph {
    pub name: String,

    #[serde(default)]
    pub known_regions: Vec<String>,

    /// Persisted id counter; see [`next_object_id`].
    pub next_id: u64,

    pub main_group: Group,

    #[serde(default)]
    pub targets: Vec<Target>,

    pub configurations: ConfigurationList,

    #[serde(default)]
    pub packages: Vec<PackageReference>,
}

impl ProjectGraph {
    /// Create an empty project graph with the standard configuration
    /// skeleton and an empty root group.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut next_id = 0;
        let main_group = Group::new(next_object_id(&mut next_id), name.clone());
        ProjectGraph {
            name,
            known_regions: vec!["en".to_string(), "Base".to_string()],
            next_id,
            main_group,
            targets: Vec::new(),
            configurations: ConfigurationList::standard_project(),
            packages: Vec::new(),
        }
    }

    pub fn alloc_id(&mut self) -> ObjectId {
        next_object_id(&mut self.next_id)
    }

    /// Look up a target by exact name.
    pub fn target(&self, name: &str) -> Result<&Target, GraphError> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| GraphError::TargetNotFound {
                name: name.to_string(),
            })
    }

    pub fn target_mut(&mut self, name: &str) -> Result<&mut Target, GraphError> {
        self.targets
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| GraphError::TargetNotFound {
                name: name.to_string(),
            })
    }

    /// Remove a target by name, dropping dependency edges in other targets
    /// that point at it.
    pub fn remove_target(&mut self, name: &str) -> Result<Target, GraphError> {
        let idx = self
            .targets
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| GraphError::TargetNotFound {
                name: name.to_string(),
            })?;
        let removed = self.targets.remove(idx);
        for target in &mut self.targets {
            target.dependencies.retain(|d| d.proxy.remote_id != removed.id);
        }
        Ok(removed)
    }

    /// Resolve a slash-separated group path, optionally creating missing
    /// components. The empty path denotes the root group.
    pub fn group_mut(
        &mut self,
        path: &str,
        create_missing: bool,
    ) -> Result<&mut Group, GraphError> {
        resolve_group_mut(&mut self.main_group, path, create_missing, &mut self.next_id)
    }

    /// All nested groups with their slash-joined paths, depth-first.
    pub fn groups(&self) -> Vec<(String, &Group)> {
        let mut out = Vec::new();
        self.main_group.collect_groups("", &mut out);
        out
    }

    /// First file reference matching `key` (exact path or name).
    pub fn find_file(&self, key: &str) -> Option<&FileReference> {
        self.main_group.find_file(key)
    }

    /// Look up a file reference by id anywhere in the tree.
    pub fn file_by_id(&self, id: &str) -> Option<&FileReference> {
        let mut files = Vec::new();
        self.main_group.collect_files(&mut files);
        files.into_iter().find(|f| f.id == id)
    }

    /// All synced folders in the tree, depth-first.
    pub fn synced_folders(&self) -> Vec<&SyncedFolder> {
        let mut out = Vec::new();
        self.main_group.collect_folders(&mut out);
        out
    }

    /// The first synced folder whose subtree covers `path`, if any.
    pub fn covering_folder(&self, path: &str) -> Option<&SyncedFolder> {
        self.synced_folders().into_iter().find(|f| f.covers(path))
    }

    /// Remove the first file reference matching `key` and cascade: every
    /// build file referencing it, across all phases of all targets, goes
    /// with it. Returns the removed reference and the cascade count.
    pub fn remove_file_cascade(&mut self, key: &str) -> Option<(FileReference, usize)> {
        let removed = self.main_group.remove_file(key)?;
        let mut cascaded = 0;
        for target in &mut self.targets {
            for phase in &mut target.phases {
                let files = phase.files_mut();
                let before = files.len();
                files.retain(|bf| bf.file_ref != removed.id);
                cascaded += before - files.len();
            }
        }
        Some((removed, cascaded))
    }

    /// Remove a whole group subtree by path, cascading build files for every
    /// file reference underneath it. Returns the cascade count.
    pub fn remove_group_cascade(&mut self, path: &str) -> Result<usize, GraphError> {
        let (parent_path, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path),
        };
        if name.is_empty() {
            return Err(GraphError::GroupNotFound {
                path: path.to_string(),
            });
        }
        let parent = self.group_mut(parent_path, false).map_err(|_| {
            GraphError::GroupNotFound {
                path: path.to_string(),
            }
        })?;
        let removed = parent
            .remove_child_group(name)
            .ok_or_else(|| GraphError::GroupNotFound {
                path: path.to_string(),
            })?;

        let mut files = Vec::new();
        removed.collect_files(&mut files);
        let ids: Vec<ObjectId> = files.into_iter().map(|f| f.id.clone()).collect();

        let mut cascaded = 0;
        for target in &mut self.targets {
            for phase in &mut target.phases {
                let list = phase.files_mut();
                let before = list.len();
                list.retain(|bf| !ids.contains(&bf.file_ref));
                cascaded += before - list.len();
            }
        }
        Ok(cascaded)
    }
}

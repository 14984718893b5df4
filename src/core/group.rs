//! The file-organization tree: groups, file references, synced folders.
//!
//! The tree is strictly a tree: each child has exactly one owning group.
//! Lookups by name take the first match in insertion order; duplicate names
//! are tolerated, not disambiguated.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::GraphError;
use crate::core::project::{next_object_id, ObjectId};

/// A leaf node pointing at a single file by project-relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReference {
    pub id: ObjectId,

    /// Logical name, usually the file name component of `path`.
    pub name: String,

    /// Path relative to the project source root.
    pub path: String,

    /// Inferred file-type tag (the lowercased extension), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl FileReference {
    pub fn new(id: ObjectId, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        let file_type = Path::new(&path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        FileReference {
            id,
            name,
            path,
            file_type,
        }
    }

    /// First-match lookup key test: exact path or exact name.
    pub fn matches(&self, key: &str) -> bool {
        self.path == key || self.name == key
    }
}

/// A directory-backed container whose subtree is implicitly synchronized.
///
/// Mutually exclusive with explicit file references under the same subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedFolder {
    pub id: ObjectId,
    pub name: String,

    /// Path relative to the project source root.
    pub path: String,
}

impl SyncedFolder {
    pub fn new(id: ObjectId, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        SyncedFolder { id, name, path }
    }

    /// Whether `path` falls inside this folder's subtree.
    pub fn covers(&self, path: &str) -> bool {
        Path::new(path).starts_with(&self.path)
    }
}

/// One child slot of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroupChild {
    File(FileReference),
    Group(Group),
    Folder(SyncedFolder),
}

/// A named container node in the file-organization tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: ObjectId,
    pub name: String,

    #[serde(default)]
    pub children: Vec<GroupChild>,
}

impl Group {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Group {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Find the first file reference matching `key` (exact path or name),
    /// depth-first in insertion order.
    pub fn find_file(&self, key: &str) -> Option<&FileReference> {
        for child in &self.children {
            match child {
                GroupChild::File(f) if f.matches(key) => return Some(f),
                GroupChild::Group(g) => {
                    if let Some(f) = g.find_file(key) {
                        return Some(f);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Remove the first file reference matching `key`, depth-first in
    /// insertion order, and return it.
    pub fn remove_file(&mut self, key: &str) -> Option<FileReference> {
        let mut found = None;
        for (idx, child) in self.children.iter().enumerate() {
            if matches!(child, GroupChild::File(f) if f.matches(key)) {
                found = Some(idx);
                break;
            }
        }
        if let Some(idx) = found {
            match self.children.remove(idx) {
                GroupChild::File(f) => return Some(f),
                _ => unreachable!("index located a file child"),
            }
        }
        for child in &mut self.children {
            if let GroupChild::Group(g) = child {
                if let Some(f) = g.remove_file(key) {
                    return Some(f);
                }
            }
        }
        None
    }

    /// Remove the first child group with the given name and return it.
    pub fn remove_child_group(&mut self, name: &str) -> Option<Group> {
        let idx = self
            .children
            .iter()
            .position(|c| matches!(c, GroupChild::Group(g) if g.name == name))?;
        match self.children.remove(idx) {
            GroupChild::Group(g) => Some(g),
            _ => unreachable!("index located a group child"),
        }
    }

    /// Collect every file reference in this subtree, in depth-first order.
    pub fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileReference>) {
        for child in &self.children {
            match child {
                GroupChild::File(f) => out.push(f),
                GroupChild::Group(g) => g.collect_files(out),
                GroupChild::Folder(_) => {}
            }
        }
    }

    /// Collect every synced folder in this subtree, in depth-first order.
    pub fn collect_folders<'a>(&'a self, out: &mut Vec<&'a SyncedFolder>) {
        for child in &self.children {
            match child {
                GroupChild::Folder(f) => out.push(f),
                GroupChild::Group(g) => g.collect_folders(out),
                GroupChild::File(_) => {}
            }
        }
    }

    /// Collect `(path, group)` pairs for every nested group, in depth-first
    /// order. `prefix` is the slash-joined path of `self` ("" for the root).
    pub fn collect_groups<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Group)>) {
        for child in &self.children {
            if let GroupChild::Group(g) = child {
                let path = if prefix.is_empty() {
                    g.name.clone()
                } else {
                    format!("{}/{}", prefix, g.name)
                };
                out.push((path.clone(), g));
                g.collect_groups(&path, out);
            }
        }
    }
}

/// Resolve a slash-separated group path from `root`, optionally creating
/// missing components. The empty path denotes the root itself.
///
/// Lookup is by exact name against child groups only; the first match in
/// insertion order wins when duplicates exist. On failure the error carries
/// the full original path, not the component that missed.
pub fn resolve_group_mut<'a>(
    root: &'a mut Group,
    path: &str,
    create_missing: bool,
    next_id: &mut u64,
) -> Result<&'a mut Group, GraphError> {
    let mut current = root;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        let idx = current
            .children
            .iter()
            .position(|c| matches!(c, GroupChild::Group(g) if g.name == part));
        let idx = match idx {
            Some(idx) => idx,
            None if create_missing => {
                let id = next_object_id(next_id);
                current.children.push(GroupChild::Group(Group::new(id, part)));
                current.children.len() - 1
            }
            None => {
                return Err(GraphError::GroupNotFound {
                    path: path.to_string(),
                })
            }
        };
        current = match &mut current.children[idx] {
            GroupChild::Group(g) => g,
            _ => unreachable!("index located a group child"),
        };
    }
    Ok(current)
}

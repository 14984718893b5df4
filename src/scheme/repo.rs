//! Scheme repository: discovery and persistence of scheme side files.
//!
//! Schemes are not part of the primary graph file. Each one is its own
//! document under the project directory:
//!
//! - shared:   `<document>/schemes/shared/<Name>.scheme.xml`
//! - per-user: `<document>/schemes/users/<user>/<Name>.scheme.xml`
//!
//! Discovery scans the shared collection first, then every user's
//! collection; the first name match wins.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::core::error::GraphError;
use crate::core::scheme::Scheme;
use crate::scheme::xml;
use crate::util::fs;

const SCHEME_EXT: &str = ".scheme.xml";

/// Discovery and persistence of scheme side files for one project document.
pub struct SchemeRepo {
    document: PathBuf,
    user: String,
}

impl SchemeRepo {
    pub fn new(document: &Path, user: impl Into<String>) -> Self {
        SchemeRepo {
            document: document.to_path_buf(),
            user: user.into(),
        }
    }

    fn shared_dir(&self) -> PathBuf {
        self.document.join("schemes").join("shared")
    }

    fn users_dir(&self) -> PathBuf {
        self.document.join("schemes").join("users")
    }

    /// The deterministic side-file path for a scheme name and shared flag.
    /// User schemes land in the configured user's collection.
    pub fn path_for(&self, name: &str, shared: bool) -> PathBuf {
        let dir = if shared {
            self.shared_dir()
        } else {
            self.users_dir().join(&self.user)
        };
        dir.join(format!("{}{}", name, SCHEME_EXT))
    }

    /// Find a scheme by name: shared collection first, then each user's
    /// collection. Returns the parsed scheme and its side-file path.
    pub fn find(&self, name: &str) -> Result<(Scheme, PathBuf)> {
        let shared_path = self.path_for(name, true);
        if shared_path.is_file() {
            let mut scheme = xml::from_xml(&fs::read_to_string(&shared_path)?, name)?;
            scheme.shared = true;
            return Ok((scheme, shared_path));
        }

        let users_dir = self.users_dir();
        if users_dir.is_dir() {
            let file_name = format!("{}{}", name, SCHEME_EXT);
            for entry in WalkDir::new(&users_dir)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file()
                    && entry.file_name().to_string_lossy() == file_name
                {
                    let path = entry.path().to_path_buf();
                    let mut scheme = xml::from_xml(&fs::read_to_string(&path)?, name)?;
                    scheme.shared = false;
                    return Ok((scheme, path));
                }
            }
        }

        Err(GraphError::SchemeNotFound {
            name: name.to_string(),
        }
        .into())
    }

    /// Serialize a scheme to its deterministic path, creating any missing
    /// directories. Returns the written path.
    pub fn save(&self, scheme: &Scheme) -> Result<PathBuf> {
        let path = self.path_for(&scheme.name, scheme.shared);
        self.write(scheme, &path)?;
        Ok(path)
    }

    /// Serialize a scheme to an explicit side-file path.
    pub fn write(&self, scheme: &Scheme, path: &Path) -> Result<()> {
        fs::write_string(path, &xml::to_xml(scheme)?)
    }

    /// Delete a scheme's side file. Fails with SchemeNotFound if no scheme
    /// with that name exists anywhere.
    pub fn delete(&self, name: &str) -> Result<PathBuf> {
        let (_, path) = self.find(name)?;
        fs::remove_file_if_exists(&path)?;
        Ok(path)
    }

    /// All schemes visible for this document: `(name, shared)` pairs, shared
    /// collection first, then user collections, each sorted by file name.
    pub fn list(&self) -> Result<Vec<(String, bool)>> {
        let mut out = Vec::new();
        collect_dir(&self.shared_dir(), true, &mut out);
        let users_dir = self.users_dir();
        if users_dir.is_dir() {
            for entry in WalkDir::new(&users_dir)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if let Some(name) = scheme_name(entry.path()) {
                    out.push((name, false));
                }
            }
        }
        Ok(out)
    }
}

fn collect_dir(dir: &Path, shared: bool, out: &mut Vec<(String, bool)>) {
    if !dir.is_dir() {
        return;
    }
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if let Some(name) = scheme_name(entry.path()) {
            out.push((name, shared));
        }
    }
}

fn scheme_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    file_name.strip_suffix(SCHEME_EXT).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigurationList;
    use crate::core::target::{ProductType, Target};
    use tempfile::TempDir;

    fn app_target() -> Target {
        let mut next = 0;
        Target::new(
            "OBJ-APP".to_string(),
            "App",
            ProductType::Application,
            ConfigurationList::standard_target(None),
            &mut next,
        )
    }

    #[test]
    fn test_save_and_find_shared() {
        let tmp = TempDir::new().unwrap();
        let repo = SchemeRepo::new(tmp.path(), "alice");
        let scheme = Scheme::new("App", true, &app_target(), None, "container:App.xcgraph");

        let path = repo.save(&scheme).unwrap();
        assert!(path.ends_with("schemes/shared/App.scheme.xml"));

        let (found, found_path) = repo.find("App").unwrap();
        assert!(found.shared);
        assert_eq!(found_path, path);
        assert_eq!(found.build.entries.len(), 1);
    }

    #[test]
    fn test_find_scans_all_user_collections() {
        let tmp = TempDir::new().unwrap();
        let writer = SchemeRepo::new(tmp.path(), "alice");
        let scheme = Scheme::new("Dev", false, &app_target(), None, "container:App.xcgraph");
        writer.save(&scheme).unwrap();

        // A different configured user still finds alice's scheme.
        let reader = SchemeRepo::new(tmp.path(), "bob");
        let (found, path) = reader.find("Dev").unwrap();
        assert!(!found.shared);
        assert!(path.to_string_lossy().contains("users/alice"));
    }

    #[test]
    fn test_shared_wins_over_user() {
        let tmp = TempDir::new().unwrap();
        let repo = SchemeRepo::new(tmp.path(), "alice");
        let shared = Scheme::new("App", true, &app_target(), None, "container:App.xcgraph");
        let user = Scheme::new("App", false, &app_target(), None, "container:App.xcgraph");
        repo.save(&user).unwrap();
        repo.save(&shared).unwrap();

        let (found, _) = repo.find("App").unwrap();
        assert!(found.shared);
    }

    #[test]
    fn test_missing_scheme() {
        let tmp = TempDir::new().unwrap();
        let repo = SchemeRepo::new(tmp.path(), "alice");
        let err = repo.find("Ghost").unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("SchemeNotFound"));
    }

    #[test]
    fn test_list_orders_shared_first() {
        let tmp = TempDir::new().unwrap();
        let repo = SchemeRepo::new(tmp.path(), "alice");
        repo.save(&Scheme::new("Zeta", true, &app_target(), None, "c")).unwrap();
        repo.save(&Scheme::new("Alpha", true, &app_target(), None, "c")).unwrap();
        repo.save(&Scheme::new("Mine", false, &app_target(), None, "c")).unwrap();

        let list = repo.list().unwrap();
        assert_eq!(
            list,
            vec![
                ("Alpha".to_string(), true),
                ("Zeta".to_string(), true),
                ("Mine".to_string(), false),
            ]
        );
    }
}

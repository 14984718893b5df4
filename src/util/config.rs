//! Configuration file support.
//!
//! Two locations are consulted:
//! - Global: `<config dir>/xcgraph/config.toml` - user-wide defaults
//! - Project: `.xcgraph/config.toml` next to the project document
//!
//! Project config takes precedence over global config. A missing or
//! malformed file falls back to defaults with a warning; configuration is
//! never load-bearing for correctness.

use std::path::Path;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::util::fs;

/// xcgraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheme: SchemeConfig,
}

/// Settings for scheme side-file handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    /// User collection name for non-shared schemes. Defaults to `$USER`,
    /// then to "default".
    pub user: Option<String>,

    /// Shell used for synthesized script actions. Defaults to /bin/sh.
    pub shell: Option<String>,
}

impl Config {
    /// Load configuration for a project document: global file first, then
    /// the project-local file layered on top.
    pub fn load(project_dir: &Path) -> Self {
        let mut config = Config::default();

        if let Some(dirs) = ProjectDirs::from("", "", "xcgraph") {
            let global = dirs.config_dir().join("config.toml");
            if global.is_file() {
                config = Self::read(&global).unwrap_or_default();
            }
        }

        let local = project_dir.join(".xcgraph").join("config.toml");
        if local.is_file() {
            if let Some(overlay) = Self::read(&local) {
                config.merge(overlay);
            }
        }

        config
    }

    fn read(path: &Path) -> Option<Config> {
        let contents = fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    fn merge(&mut self, overlay: Config) {
        if overlay.scheme.user.is_some() {
            self.scheme.user = overlay.scheme.user;
        }
        if overlay.scheme.shell.is_some() {
            self.scheme.shell = overlay.scheme.shell;
        }
    }

    /// The user collection name for non-shared schemes.
    pub fn scheme_user(&self) -> String {
        self.scheme
            .user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "default".to_string())
    }

    /// The shell for synthesized script actions.
    pub fn script_shell(&self) -> String {
        self.scheme
            .shell
            .clone()
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_config_overrides() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".xcgraph");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[scheme]\nuser = \"ci\"\nshell = \"/bin/zsh\"\n",
        )
        .unwrap();

        let config = Config::load(tmp.path());
        assert_eq!(config.scheme_user(), "ci");
        assert_eq!(config.script_shell(), "/bin/zsh");
    }

    #[test]
    fn test_defaults_without_files() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path());
        assert_eq!(config.script_shell(), "/bin/sh");
    }
}

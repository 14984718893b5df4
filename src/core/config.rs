//! Build configurations and configuration lists.
//!
//! A configuration list is attached to either the project (project-level
//! settings) or a target (target-level settings). This module only edits one
//! layer at a time; it never merges the two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::GraphError;

/// The two configurations every fresh list starts with.
pub const DEBUG: &str = "Debug";
pub const RELEASE: &str = "Release";

/// A named build configuration: setting name -> string value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub name: String,

    /// Setting values. BTreeMap keeps serialized and reported order stable.
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    /// Relative path of a base configuration file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_configuration: Option<String>,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        BuildConfiguration {
            name: name.into(),
            settings: BTreeMap::new(),
            base_configuration: None,
        }
    }
}

/// An ordered set of build configurations plus a default-configuration name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationList {
    pub configurations: Vec<BuildConfiguration>,
    pub default_configuration: String,
}

impl ConfigurationList {
    /// The Debug+Release skeleton for a new project (no preset values).
    pub fn standard_project() -> Self {
        ConfigurationList {
            configurations: vec![BuildConfiguration::new(DEBUG), BuildConfiguration::new(RELEASE)],
            default_configuration: RELEASE.to_string(),
        }
    }

    /// The Debug+Release skeleton for a new target.
    ///
    /// Both configurations get `PRODUCT_NAME = $(TARGET_NAME)`, and the
    /// bundle identifier on both when provided.
    pub fn standard_target(bundle_id: Option<&str>) -> Self {
        let mut list = Self::standard_project();
        for config in &mut list.configurations {
            config
                .settings
                .insert("PRODUCT_NAME".to_string(), "$(TARGET_NAME)".to_string());
            if let Some(id) = bundle_id {
                config
                    .settings
                    .insert("PRODUCT_BUNDLE_IDENTIFIER".to_string(), id.to_string());
            }
        }
        list
    }

    /// Configuration names, in list order.
    pub fn names(&self) -> Vec<&str> {
        self.configurations.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&BuildConfiguration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BuildConfiguration> {
        self.configurations.iter_mut().find(|c| c.name == name)
    }

    /// Set a build setting on one configuration, or on all of them when
    /// `configuration` is `None`. Returns the names that were updated.
    pub fn set(
        &mut self,
        key: &str,
        value: &str,
        configuration: Option<&str>,
    ) -> Result<Vec<String>, GraphError> {
        match configuration {
            Some(name) => {
                let config = self
                    .get_mut(name)
                    .ok_or_else(|| GraphError::configuration_not_found(name))?;
                config.settings.insert(key.to_string(), value.to_string());
                Ok(vec![name.to_string()])
            }
            None => {
                let mut updated = Vec::new();
                for config in &mut self.configurations {
                    config.settings.insert(key.to_string(), value.to_string());
                    updated.push(config.name.clone());
                }
                Ok(updated)
            }
        }
    }
}

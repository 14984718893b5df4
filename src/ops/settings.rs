//! Build setting operations.
//!
//! Settings are edited at either the project layer or a target layer,
//! never merged. `target = None` addresses the project's configuration
//! list; `configuration = None` addresses every configuration in the list.

use std::path::Path;

use anyhow::Result;

use crate::core::config::ConfigurationList;
use crate::core::project::ProjectGraph;
use crate::ops::{read_graph, with_graph, Report};

fn layer<'a>(
    graph: &'a ProjectGraph,
    target: Option<&str>,
) -> Result<&'a ConfigurationList> {
    match target {
        Some(name) => Ok(&graph.target(name)?.configurations),
        None => Ok(&graph.configurations),
    }
}

fn layer_mut<'a>(
    graph: &'a mut ProjectGraph,
    target: Option<&str>,
) -> Result<&'a mut ConfigurationList> {
    match target {
        Some(name) => Ok(&mut graph.target_mut(name)?.configurations),
        None => Ok(&mut graph.configurations),
    }
}

/// Set one build setting to a string value on one or all configurations of
/// the addressed layer.
pub fn update_build_setting(
    document: &Path,
    key: &str,
    value: &str,
    target: Option<&str>,
    configuration: Option<&str>,
) -> Result<Report> {
    with_graph(document, |graph| {
        let list = layer_mut(graph, target)?;
        let updated = list.set(key, value, configuration)?;

        tracing::debug!(key, value, ?target, "updated build setting");
        Ok(Report::new()
            .with("setting", key)
            .with("value", value)
            .with("updated", updated))
    })
}

/// Read the settings of the addressed layer: one configuration's flat map,
/// or a map per configuration.
pub fn get_build_settings(
    document: &Path,
    target: Option<&str>,
    configuration: Option<&str>,
) -> Result<Report> {
    read_graph(document, |graph| {
        let list = layer(graph, target)?;
        let mut report = Report::new();
        match configuration {
            Some(name) => {
                let config = list
                    .get(name)
                    .ok_or_else(|| crate::core::error::GraphError::configuration_not_found(name))?;
                report.set("configuration", name);
                report.set("settings", &config.settings);
            }
            None => {
                let all: serde_json::Map<String, serde_json::Value> = list
                    .configurations
                    .iter()
                    .map(|c| {
                        (
                            c.name.clone(),
                            serde_json::to_value(&c.settings).unwrap_or_default(),
                        )
                    })
                    .collect();
                report.set("settings", all);
            }
        }
        Ok(report)
    })
}

/// List configuration names and the default for the addressed layer.
pub fn list_configurations(document: &Path, target: Option<&str>) -> Result<Report> {
    read_graph(document, |graph| {
        let list = layer(graph, target)?;
        Ok(Report::new()
            .with("configurations", list.names())
            .with("default_configuration", list.default_configuration.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GraphError;
    use crate::ops::{add_target, new_project, AddTargetOptions};
    use serde_json::json;
    use tempfile::TempDir;

    fn project_with_target() -> (TempDir, std::path::PathBuf) {
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

    #[test]
    fn test_update_all_configurations() {
        let (_tmp, doc) = project_with_target();
        let report =
            update_build_setting(&doc, "SWIFT_VERSION", "6.0", Some("App"), None).unwrap();
        assert_eq!(report.get("updated"), Some(&json!(["Debug", "Release"])));

        for config in ["Debug", "Release"] {
            let settings = get_build_settings(&doc, Some("App"), Some(config)).unwrap();
            assert_eq!(settings.get("settings").unwrap()["SWIFT_VERSION"], json!("6.0"));
        }
    }

    #[test]
    fn test_update_single_configuration() {
        let (_tmp, doc) = project_with_target();
        update_build_setting(&doc, "SWIFT_VERSION", "6.0", Some("App"), Some("Debug")).unwrap();

        let debug = get_build_settings(&doc, Some("App"), Some("Debug")).unwrap();
        assert_eq!(debug.get("settings").unwrap()["SWIFT_VERSION"], json!("6.0"));

        let release = get_build_settings(&doc, Some("App"), Some("Release")).unwrap();
        assert!(release.get("settings").unwrap().get("SWIFT_VERSION").is_none());
    }

    #[test]
    fn test_project_layer_is_separate() {
        let (_tmp, doc) = project_with_target();
        update_build_setting(&doc, "IPHONEOS_DEPLOYMENT_TARGET", "17.0", None, None).unwrap();

        let project = get_build_settings(&doc, None, Some("Debug")).unwrap();
        assert_eq!(
            project.get("settings").unwrap()["IPHONEOS_DEPLOYMENT_TARGET"],
            json!("17.0")
        );
        let target = get_build_settings(&doc, Some("App"), Some("Debug")).unwrap();
        assert!(target
            .get("settings")
            .unwrap()
            .get("IPHONEOS_DEPLOYMENT_TARGET")
            .is_none());
    }

    #[test]
    fn test_unknown_configuration() {
        let (_tmp, doc) = project_with_target();
        let err =
            update_build_setting(&doc, "X", "1", Some("App"), Some("Beta")).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("ConfigurationNotFound"));
    }

    #[test]
    fn test_get_settings_is_idempotent() {
        let (_tmp, doc) = project_with_target();
        update_build_setting(&doc, "SWIFT_VERSION", "6.0", Some("App"), None).unwrap();
        let first = get_build_settings(&doc, Some("App"), None).unwrap();
        let second = get_build_settings(&doc, Some("App"), None).unwrap();
        assert_eq!(first.to_json(), second.to_json());
    }
}

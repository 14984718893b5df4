//! Target and dependency operations.

use std::path::Path;

use anyhow::Result;

use crate::core::config::ConfigurationList;
use crate::core::target::{ContainerItemProxy, ProductType, Target, TargetDependency};
use crate::ops::{container_name, read_graph, with_graph, Report};

/// Options for creating a target.
#[derive(Debug, Clone)]
pub struct AddTargetOptions {
    pub name: String,

    /// Product-type token (case-insensitive, several aliases per type).
    pub product_type: String,

    /// Bundle identifier set on both default configurations when provided.
    pub bundle_id: Option<String>,
}

/// Create a target with the default Debug+Release configuration skeleton
/// and empty sources/frameworks/resources phases.
pub fn add_target(document: &Path, opts: &AddTargetOptions) -> Result<Report> {
    with_graph(document, |graph| {
        let (product_type, recognized) = ProductType::parse_token(&opts.product_type);
        if !recognized {
            tracing::warn!(
                token = opts.product_type,
                "unrecognized product type, defaulting to application"
            );
        }

        let id = graph.alloc_id();
        let mut next_id = graph.next_id;
        let target = Target::new(
            id,
            &opts.name,
            product_type,
            ConfigurationList::standard_target(opts.bundle_id.as_deref()),
            &mut next_id,
        );
        graph.next_id = next_id;
        graph.targets.push(target);

        tracing::info!(name = opts.name, product = product_type.token(), "added target");
        Ok(Report::new()
            .with("target", opts.name.clone())
            .with("product_type", product_type.token()))
    })
}

/// Remove a target by name, dropping dependency edges pointing at it.
pub fn remove_target(document: &Path, name: &str) -> Result<Report> {
    with_graph(document, |graph| {
        let removed = graph.remove_target(name)?;
        tracing::info!(name, "removed target");
        Ok(Report::new()
            .with("removed", removed.name)
            .with("product_type", removed.product_type.token()))
    })
}

/// List target names in document order.
pub fn list_targets(document: &Path) -> Result<Report> {
    read_graph(document, |graph| {
        let names: Vec<String> = graph.targets.iter().map(|t| t.name.clone()).collect();
        Ok(Report::new().with("count", names.len()).with("targets", names))
    })
}

/// Report a target's product type, configurations, dependencies, phases,
/// and package products.
pub fn get_target_info(document: &Path, name: &str) -> Result<Report> {
    read_graph(document, |graph| {
        let target = graph.target(name)?;
        let dependencies: Vec<&str> = target.dependencies.iter().map(|d| d.name.as_str()).collect();
        let phases: Vec<&str> = target.phases.iter().map(|p| p.kind_name()).collect();
        let products: Vec<&str> = target
            .package_products
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();

        Ok(Report::new()
            .with("target", target.name.clone())
            .with("product_type", target.product_type.token())
            .with("configurations", target.configurations.names())
            .with("default_configuration", target.configurations.default_configuration.clone())
            .with("dependencies", dependencies)
            .with("phases", phases)
            .with("package_products", products))
    })
}

/// Record a dependency edge from `target` to `depends_on` through a
/// container item proxy. Both targets must exist. Neither cycles nor
/// duplicates are checked.
pub fn add_target_dependency(document: &Path, target: &str, depends_on: &str) -> Result<Report> {
    let container = container_name(document);
    with_graph(document, |graph| {
        let dependency = graph.target(depends_on)?;
        let proxy = ContainerItemProxy {
            container_portal: container.clone(),
            remote_id: dependency.id.clone(),
            remote_name: dependency.name.clone(),
        };

        let id = graph.alloc_id();
        let dependent = graph.target_mut(target)?;
        dependent.dependencies.push(TargetDependency {
            id,
            name: depends_on.to_string(),
            proxy,
        });

        tracing::debug!(target, depends_on, "added target dependency");
        Ok(Report::new()
            .with("target", target)
            .with("depends_on", depends_on))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GraphError;
    use crate::ops::new_project;
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("Demo.xcgraph");
        new_project(&doc, "Demo").unwrap();
        (tmp, doc)
    }

    fn add(doc: &Path, name: &str, ty: &str) {
        add_target(
            doc,
            &AddTargetOptions {
                name: name.to_string(),
                product_type: ty.to_string(),
                bundle_id: Some(format!("com.example.{name}")),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_add_and_list_targets() {
        let (_tmp, doc) = project();
        add(&doc, "NewFramework", "framework");
        let listed = list_targets(&doc).unwrap();
        assert_eq!(listed.get("targets"), Some(&json!(["NewFramework"])));
    }

    #[test]
    fn test_target_info_reports_defaults() {
        let (_tmp, doc) = project();
        add(&doc, "NewFramework", "framework");
        let info = get_target_info(&doc, "NewFramework").unwrap();
        assert_eq!(info.get("product_type"), Some(&json!("framework")));
        assert_eq!(info.get("configurations"), Some(&json!(["Debug", "Release"])));
        assert_eq!(info.get("default_configuration"), Some(&json!("Release")));
    }

    #[test]
    fn test_dependency_edge_appears_in_info() {
        let (_tmp, doc) = project();
        add(&doc, "A", "app");
        add(&doc, "B", "framework");
        add_target_dependency(&doc, "A", "B").unwrap();

        let info = get_target_info(&doc, "A").unwrap();
        assert_eq!(info.get("dependencies"), Some(&json!(["B"])));
    }

    #[test]
    fn test_dependency_requires_both_targets() {
        let (_tmp, doc) = project();
        add(&doc, "A", "app");
        let err = add_target_dependency(&doc, "A", "Ghost").unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("TargetNotFound"));
    }

    #[test]
    fn test_no_cycle_detection() {
        let (_tmp, doc) = project();
        add(&doc, "A", "app");
        add(&doc, "B", "framework");
        add_target_dependency(&doc, "A", "B").unwrap();
        // The reverse edge is accepted: no cycle detection happens.
        add_target_dependency(&doc, "B", "A").unwrap();
        let info = get_target_info(&doc, "B").unwrap();
        assert_eq!(info.get("dependencies"), Some(&json!(["A"])));
    }

    #[test]
    fn test_remove_target_drops_edges() {
        let (_tmp, doc) = project();
        add(&doc, "A", "app");
        add(&doc, "B", "framework");
        add_target_dependency(&doc, "A", "B").unwrap();
        remove_target(&doc, "B").unwrap();

        let info = get_target_info(&doc, "A").unwrap();
        assert_eq!(info.get("dependencies"), Some(&json!([])));
        let listed = list_targets(&doc).unwrap();
        assert_eq!(listed.get("targets"), Some(&json!(["A"])));
    }

    #[test]
    fn test_unknown_product_type_defaults_to_application() {
        let (_tmp, doc) = project();
        add(&doc, "Odd", "hologram");
        let info = get_target_info(&doc, "Odd").unwrap();
        assert_eq!(info.get("product_type"), Some(&json!("application")));
    }
}

//! Package reference operations.

use std::path::Path;

use anyhow::{Context, Result};
use url::Url;

use crate::core::package::{
    LocalPackage, PackageReference, ProductDependency, RemotePackage, VersionRule,
};
use crate::ops::{read_graph, source_root, with_graph, Report};
use crate::util::fs::relative_path;

/// Options for adding a remote package reference.
#[derive(Debug, Clone)]
pub struct RemotePackageOptions {
    pub url: String,

    /// Product name to attach to the consuming target.
    pub product: String,

    /// Consuming target name.
    pub target: String,

    /// Version value interpreted under `rule`.
    pub version: String,

    /// Rule token: up-to-next-major, up-to-next-minor, exact, branch,
    /// or revision.
    pub rule: String,
}

/// Register a remote package reference on the project and attach one of its
/// products to a target.
pub fn add_remote_package(document: &Path, opts: &RemotePackageOptions) -> Result<Report> {
    let parsed = Url::parse(&opts.url)
        .with_context(|| format!("invalid repository url: {}", opts.url))?;
    let requirement = VersionRule::parse(&opts.rule, &opts.version);

    with_graph(document, |graph| {
        graph.target(&opts.target)?;

        let package_id = graph.alloc_id();
        graph.packages.push(PackageReference::Remote(RemotePackage {
            id: package_id.clone(),
            repository_url: parsed.to_string(),
            requirement: requirement.clone(),
        }));

        let product_id = graph.alloc_id();
        let target = graph.target_mut(&opts.target)?;
        target.package_products.push(ProductDependency {
            id: product_id,
            product_name: opts.product.clone(),
            package: package_id,
        });

        tracing::info!(
            url = opts.url,
            product = opts.product,
            target = opts.target,
            "added remote package"
        );
        Ok(Report::new()
            .with("package", parsed.to_string())
            .with("product", opts.product.clone())
            .with("target", opts.target.clone())
            .with("requirement", requirement.describe()))
    })
}

/// Register a local package reference, stored as a path relative to the
/// project source root, and attach one of its products to a target.
pub fn add_local_package(
    document: &Path,
    path: &Path,
    product: &str,
    target_name: &str,
) -> Result<Report> {
    let root = source_root(document);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    let relative = relative_path(root, &absolute);
    let relative = relative.to_string_lossy().into_owned();

    with_graph(document, |graph| {
        graph.target(target_name)?;

        let package_id = graph.alloc_id();
        graph.packages.push(PackageReference::Local(LocalPackage {
            id: package_id.clone(),
            relative_path: relative.clone(),
        }));

        let product_id = graph.alloc_id();
        let target = graph.target_mut(target_name)?;
        target.package_products.push(ProductDependency {
            id: product_id,
            product_name: product.to_string(),
            package: package_id,
        });

        tracing::info!(path = relative, product, target = target_name, "added local package");
        Ok(Report::new()
            .with("package", relative.clone())
            .with("product", product)
            .with("target", target_name))
    })
}

/// List package references with their requirement or path.
pub fn list_packages(document: &Path) -> Result<Report> {
    read_graph(document, |graph| {
        let packages: Vec<serde_json::Value> = graph
            .packages
            .iter()
            .map(|package| match package {
                PackageReference::Remote(p) => serde_json::json!({
                    "id": package.id(),
                    "kind": "remote",
                    "url": p.repository_url,
                    "requirement": p.requirement.describe(),
                }),
                PackageReference::Local(p) => serde_json::json!({
                    "id": package.id(),
                    "kind": "local",
                    "path": p.relative_path,
                }),
            })
            .collect();
        Ok(Report::new()
            .with("count", packages.len())
            .with("packages", packages))
    })
}

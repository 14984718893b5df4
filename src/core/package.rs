//! Package references and product dependencies.
//!
//! A remote package reference carries a repository URL plus a version
//! requirement rule; a local package reference carries a relative filesystem
//! path. A product dependency attaches one named package product to a
//! consuming target. No transitive resolution happens here.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::project::ObjectId;

/// Version requirement rule for a remote package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum VersionRule {
    UpToNextMajor { from: String },
    UpToNextMinor { from: String },
    Exact { version: String },
    Branch { name: String },
    Revision { rev: String },
}

impl VersionRule {
    /// Build a version rule from a rule token and its value.
    ///
    /// Unrecognized rule tokens default to up-to-next-major. Version values
    /// that do not parse as semver are kept verbatim with a warning; the
    /// document format stores them as strings either way.
    pub fn parse(rule: &str, value: &str) -> Self {
        let rule = rule.to_lowercase();
        match rule.as_str() {
            "branch" => return VersionRule::Branch {
                name: value.to_string(),
            },
            "revision" | "rev" => return VersionRule::Revision {
                rev: value.to_string(),
            },
            _ => {}
        }

        if Version::parse(value).is_err() {
            tracing::warn!(version = value, "version is not valid semver, keeping as-is");
        }
        match rule.as_str() {
            "exact" => VersionRule::Exact {
                version: value.to_string(),
            },
            "up-to-next-minor" | "uptonextminor" | "minor" => VersionRule::UpToNextMinor {
                from: value.to_string(),
            },
            "up-to-next-major" | "uptonextmajor" | "major" => VersionRule::UpToNextMajor {
                from: value.to_string(),
            },
            other => {
                tracing::warn!(rule = other, "unrecognized version rule, using up-to-next-major");
                VersionRule::UpToNextMajor {
                    from: value.to_string(),
                }
            }
        }
    }

    /// Human-readable requirement, e.g. `up-to-next-major from 1.2.0`.
    pub fn describe(&self) -> String {
        match self {
            VersionRule::UpToNextMajor { from } => format!("up-to-next-major from {}", from),
            VersionRule::UpToNextMinor { from } => format!("up-to-next-minor from {}", from),
            VersionRule::Exact { version } => format!("exact {}", version),
            VersionRule::Branch { name } => format!("branch {}", name),
            VersionRule::Revision { rev } => format!("revision {}", rev),
        }
    }
}

/// A remote package reference on the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePackage {
    pub id: ObjectId,
    pub repository_url: String,
    pub requirement: VersionRule,
}

/// A local package reference on the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalPackage {
    pub id: ObjectId,

    /// Path relative to the project source root; not checked against disk.
    pub relative_path: String,
}

/// A package reference held by the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageReference {
    Remote(RemotePackage),
    Local(LocalPackage),
}

impl PackageReference {
    /// Stable object id of the reference, whichever kind it is.
    pub fn id(&self) -> &ObjectId {
        match self {
            PackageReference::Remote(p) => &p.id,
            PackageReference::Local(p) => &p.id,
        }
    }
}

/// A named product supplied by a package, attached to a consuming target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDependency {
    pub id: ObjectId,
    pub product_name: String,

    /// Id of the package reference supplying the product.
    pub package: ObjectId,
}

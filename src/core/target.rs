//! Targets, product types, and inter-target dependency edges.

use serde::{Deserialize, Serialize};

use crate::core::config::ConfigurationList;
use crate::core::package::ProductDependency;
use crate::core::phase::{BuildPhase, FilesPhase};
use crate::core::project::{next_object_id, ObjectId};

/// The flavor of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Native,
    Aggregate,
    Legacy,
}

/// What kind of product a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    Application,
    Framework,
    StaticLibrary,
    DynamicLibrary,
    UnitTestBundle,
    UiTestBundle,
    AppExtension,
    CommandLineTool,
    Bundle,
}

impl ProductType {
    /// Map a product-type token to a product type, case-insensitively.
    ///
    /// Unrecognized tokens fall back to `Application`; the caller is
    /// expected to log the fallback.
    pub fn parse_token(token: &str) -> (ProductType, bool) {
        let ty = match token.to_lowercase().as_str() {
            "app" | "application" => ProductType::Application,
            "framework" => ProductType::Framework,
            "static-library" | "staticlib" | "static" => ProductType::StaticLibrary,
            "dynamic-library" | "dylib" | "dynamic" => ProductType::DynamicLibrary,
            "unit-test-bundle" | "unit-test" | "unit-tests" | "test-bundle" | "tests" => {
                ProductType::UnitTestBundle
            }
            "ui-test-bundle" | "ui-test" | "ui-tests" => ProductType::UiTestBundle,
            "app-extension" | "extension" => ProductType::AppExtension,
            "command-line-tool" | "commandline" | "tool" | "cli" => ProductType::CommandLineTool,
            "bundle" => ProductType::Bundle,
            _ => return (ProductType::Application, false),
        };
        (ty, true)
    }

    /// Stable token used in reports and serialized documents.
    pub fn token(&self) -> &'static str {
        match self {
            ProductType::Application => "application",
            ProductType::Framework => "framework",
            ProductType::StaticLibrary => "static-library",
            ProductType::DynamicLibrary => "dynamic-library",
            ProductType::UnitTestBundle => "unit-test-bundle",
            ProductType::UiTestBundle => "ui-test-bundle",
            ProductType::AppExtension => "app-extension",
            ProductType::CommandLineTool => "command-line-tool",
            ProductType::Bundle => "bundle",
        }
    }

    /// The built artifact's file name for a target name, used when deriving
    /// scheme buildable references.
    pub fn artifact_name(&self, target_name: &str) -> String {
        match self {
            ProductType::Application => format!("{}.app", target_name),
            ProductType::Framework => format!("{}.framework", target_name),
            ProductType::StaticLibrary => format!("lib{}.a", target_name),
            ProductType::DynamicLibrary => format!("lib{}.dylib", target_name),
            ProductType::UnitTestBundle | ProductType::UiTestBundle => {
                format!("{}.xctest", target_name)
            }
            ProductType::AppExtension => format!("{}.appex", target_name),
            ProductType::CommandLineTool => target_name.to_string(),
            ProductType::Bundle => format!("{}.bundle", target_name),
        }
    }

}

/// Indirection object used to reference another target when recording a
/// dependency edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerItemProxy {
    /// The containing document, as `container:<document name>`.
    pub container_portal: String,

    /// Id of the depended-upon target.
    pub remote_id: ObjectId,

    /// Name of the depended-upon target.
    pub remote_name: String,
}

/// A dependency edge from one target to another, via a proxy.
///
/// The edge list is append-only and unchecked: neither cycles nor duplicate
/// edges are detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDependency {
    pub id: ObjectId,
    pub name: String,
    pub proxy: ContainerItemProxy,
}

/// A buildable unit within the project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: ObjectId,
    pub name: String,

    #[serde(default)]
    pub kind: TargetKind,

    pub product_type: ProductType,

    #[serde(default)]
    pub phases: Vec<BuildPhase>,

    #[serde(default)]
    pub dependencies: Vec<TargetDependency>,

    pub configurations: ConfigurationList,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_products: Vec<ProductDependency>,

    /// Ids of synced folders registered on this target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synced_folders: Vec<ObjectId>,
}

impl Target {
    /// Create a native target with the default phase skeleton: empty
    /// sources, frameworks, and resources phases, in that order.
    pub fn new(
        id: ObjectId,
        name: impl Into<String>,
        product_type: ProductType,
        configurations: ConfigurationList,
        next_id: &mut u64,
    ) -> Self {
        let phases = vec![
            BuildPhase::Sources(FilesPhase::new(next_object_id(next_id))),
            BuildPhase::Frameworks(FilesPhase::new(next_object_id(next_id))),
            BuildPhase::Resources(FilesPhase::new(next_object_id(next_id))),
        ];
        Target {
            id,
            name: name.into(),
            kind: TargetKind::Native,
            product_type,
            phases,
            dependencies: Vec::new(),
            configurations,
            package_products: Vec::new(),
            synced_folders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_aliases() {
        assert_eq!(ProductType::parse_token("APP"), (ProductType::Application, true));
        assert_eq!(ProductType::parse_token("staticlib"), (ProductType::StaticLibrary, true));
        assert_eq!(ProductType::parse_token("tool"), (ProductType::CommandLineTool, true));
        assert_eq!(
            ProductType::parse_token("unit-tests"),
            (ProductType::UnitTestBundle, true)
        );
    }

    #[test]
    fn test_unknown_token_defaults_to_application() {
        let (ty, recognized) = ProductType::parse_token("hologram");
        assert_eq!(ty, ProductType::Application);
        assert!(!recognized);
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(ProductType::Application.artifact_name("App"), "App.app");
        assert_eq!(ProductType::StaticLibrary.artifact_name("Core"), "libCore.a");
        assert_eq!(ProductType::UnitTestBundle.artifact_name("AppTests"), "AppTests.xctest");
        assert_eq!(ProductType::CommandLineTool.artifact_name("ctl"), "ctl");
    }

    #[test]
    fn test_new_target_phase_skeleton() {
        let mut next = 0;
        let target = Target::new(
            "OBJ-10".to_string(),
            "App",
            ProductType::Application,
            ConfigurationList::standard_target(None),
            &mut next,
        );
        let kinds: Vec<_> = target.phases.iter().map(|p| p.kind_name()).collect();
        assert_eq!(kinds, vec!["sources", "frameworks", "resources"]);
        assert!(target.dependencies.is_empty());
    }
}

//! Scheme operations.
//!
//! Schemes live in side files under the project document, not in the
//! primary graph, so most operations here go through [`SchemeRepo`] only.
//! Operations that need target identity (creation, coverage restriction,
//! testables) also load the graph. All of them serialize on the document
//! lock so a scheme edit never races a graph edit.

use std::path::Path;

use anyhow::Result;

use crate::core::error::GraphError;
use crate::core::project::ProjectGraph;
use crate::core::scheme::{
    BuildableReference, CommandLineArgument, EnvironmentVariable, ExecutionAction, Scheme,
    SchemeAction, TestableReference,
};
use crate::ops::{container_name, source_root, Report};
use crate::scheme::SchemeRepo;
use crate::store::{lock, JsonStore, ProjectStore};
use crate::util::Config;

/// Options for creating a scheme.
#[derive(Debug, Clone)]
pub struct CreateSchemeOptions {
    pub name: String,

    /// Target whose product the scheme builds and launches.
    pub target: String,

    /// Optional test-bundle target wired into the test action.
    pub test_target: Option<String>,

    /// Shared collection or the configured user's collection.
    pub shared: bool,
}

/// Options for updating scheme-level fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateSchemeOptions {
    pub name: String,

    /// New configuration for the launch, test, and analyze actions.
    pub build_configuration: Option<String>,

    /// Toggle test-action code coverage.
    pub code_coverage: Option<bool>,

    /// Rename the scheme, moving its side file.
    pub new_name: Option<String>,
}

/// Options for appending a pre- or post-action script.
#[derive(Debug, Clone)]
pub struct SchemeActionOptions {
    pub scheme: String,

    /// Action token: build, test, launch, profile, or archive.
    pub action: String,

    /// Pre-action when true, post-action otherwise.
    pub pre: bool,

    pub title: Option<String>,
    pub script: String,
    pub shell: Option<String>,
}

fn repo_for(document: &Path, config: &Config) -> SchemeRepo {
    SchemeRepo::new(document, config.scheme_user())
}

/// Run a scheme operation under the document lock, without touching the
/// primary graph. The closure also receives the loaded config so callers
/// never reload it.
fn with_repo<T>(
    document: &Path,
    f: impl FnOnce(&SchemeRepo, &Config) -> Result<T>,
) -> Result<T> {
    let handle = lock::document_lock(document);
    let _guard = lock::acquire(&handle);

    let config = Config::load(source_root(document));
    f(&repo_for(document, &config), &config)
}

/// Run a scheme operation that also reads the primary graph.
fn with_repo_and_graph<T>(
    document: &Path,
    f: impl FnOnce(&SchemeRepo, &ProjectGraph) -> Result<T>,
) -> Result<T> {
    let handle = lock::document_lock(document);
    let _guard = lock::acquire(&handle);

    let config = Config::load(source_root(document));
    let graph = JsonStore.load(document)?;
    f(&repo_for(document, &config), &graph)
}

/// Create a scheme with the default six actions for a target.
///
/// The name-conflict check spans both the shared and the user collections,
/// not just the one being written to: discovery is first-match by name, so
/// a same-named scheme in either collection would shadow or be shadowed by
/// the new one.
pub fn create_scheme(document: &Path, opts: &CreateSchemeOptions) -> Result<Report> {
    let container = container_name(document);
    with_repo_and_graph(document, |repo, graph| {
        if repo.find(&opts.name).is_ok() {
            return Err(GraphError::SchemeAlreadyExists {
                name: opts.name.clone(),
            }
            .into());
        }

        let target = graph.target(&opts.target)?;
        let test_target = match &opts.test_target {
            Some(name) => Some(graph.target(name)?),
            None => None,
        };

        let scheme = Scheme::new(&opts.name, opts.shared, target, test_target, &container);
        let path = repo.save(&scheme)?;

        tracing::info!(name = opts.name, shared = opts.shared, "created scheme");
        Ok(Report::new()
            .with("scheme", opts.name.clone())
            .with("shared", opts.shared)
            .with("path", path.to_string_lossy().into_owned()))
    })
}

/// List visible schemes: shared collection first, then user collections.
pub fn list_schemes(document: &Path) -> Result<Report> {
    with_repo(document, |repo, _| {
        let schemes: Vec<serde_json::Value> = repo
            .list()?
            .into_iter()
            .map(|(name, shared)| serde_json::json!({ "name": name, "shared": shared }))
            .collect();
        Ok(Report::new()
            .with("count", schemes.len())
            .with("schemes", schemes))
    })
}

/// Report a scheme's action configurations, entries, and testables.
pub fn get_scheme_info(document: &Path, name: &str) -> Result<Report> {
    with_repo(document, |repo, _| {
        let (scheme, path) = repo.find(name)?;

        let entries: Vec<&str> = scheme
            .build
            .entries
            .iter()
            .map(|e| e.reference.target_name.as_str())
            .collect();
        let testables: Vec<&str> = scheme
            .test
            .testables
            .iter()
            .map(|t| t.reference.target_name.as_str())
            .collect();
        let coverage_targets: Vec<&str> = scheme
            .test
            .coverage_targets
            .iter()
            .map(|r| r.target_name.as_str())
            .collect();

        Ok(Report::new()
            .with("scheme", scheme.name.clone())
            .with("shared", scheme.shared)
            .with("path", path.to_string_lossy().into_owned())
            .with("build_entries", entries)
            .with("testables", testables)
            .with("launch_configuration", scheme.launch.build_configuration.clone())
            .with("test_configuration", scheme.test.build_configuration.clone())
            .with("archive_configuration", scheme.archive.build_configuration.clone())
            .with("code_coverage", scheme.test.code_coverage)
            .with("coverage_targets", coverage_targets))
    })
}

/// Update a scheme's build configuration, coverage flag, or name.
///
/// A rename deletes the old side file and then writes the new one; the two
/// steps are not atomic.
pub fn update_scheme(document: &Path, opts: &UpdateSchemeOptions) -> Result<Report> {
    with_repo(document, |repo, _| {
        let (mut scheme, old_path) = repo.find(&opts.name)?;

        if let Some(configuration) = &opts.build_configuration {
            scheme.set_build_configuration(configuration);
        }
        if let Some(enabled) = opts.code_coverage {
            scheme.test.code_coverage = enabled;
        }
        if let Some(new_name) = &opts.new_name {
            if repo.find(new_name).is_ok() {
                return Err(GraphError::SchemeAlreadyExists {
                    name: new_name.clone(),
                }
                .into());
            }
            crate::util::fs::remove_file_if_exists(&old_path)?;
            scheme.name = new_name.clone();
        }

        let path = repo.save(&scheme)?;
        tracing::info!(name = opts.name, "updated scheme");
        Ok(Report::new()
            .with("scheme", scheme.name.clone())
            .with("path", path.to_string_lossy().into_owned()))
    })
}

/// Delete a scheme's side file.
pub fn delete_scheme(document: &Path, name: &str) -> Result<Report> {
    with_repo(document, |repo, _| {
        let path = repo.delete(name)?;
        tracing::info!(name, "deleted scheme");
        Ok(Report::new()
            .with("removed", name)
            .with("path", path.to_string_lossy().into_owned()))
    })
}

/// Append a pre- or post-action shell script to one of a scheme's actions.
pub fn add_scheme_action(document: &Path, opts: &SchemeActionOptions) -> Result<Report> {
    let action = SchemeAction::parse(&opts.action)?;
    with_repo(document, |repo, config| {
        let (mut scheme, _) = repo.find(&opts.scheme)?;

        let exec = ExecutionAction {
            title: opts
                .title
                .clone()
                .unwrap_or_else(|| "Run Script".to_string()),
            shell_path: opts.shell.clone().unwrap_or_else(|| config.script_shell()),
            script: opts.script.clone(),
        };
        scheme.push_execution_action(action, opts.pre, exec);
        repo.save(&scheme)?;

        tracing::debug!(scheme = opts.scheme, action = opts.action, pre = opts.pre, "added scheme action");
        Ok(Report::new()
            .with("scheme", opts.scheme.clone())
            .with("action", opts.action.to_lowercase())
            .with("timing", if opts.pre { "pre" } else { "post" }))
    })
}

/// Replace the environment variable list of the launch or test action.
pub fn set_scheme_environment(
    document: &Path,
    scheme_name: &str,
    action: &str,
    entries: &[(String, String)],
) -> Result<Report> {
    let action = SchemeAction::parse_runnable(action)?;
    with_repo(document, |repo, _| {
        let (mut scheme, _) = repo.find(scheme_name)?;

        let variables: Vec<EnvironmentVariable> = entries
            .iter()
            .map(|(key, value)| EnvironmentVariable {
                key: key.clone(),
                value: value.clone(),
                enabled: true,
            })
            .collect();
        let count = variables.len();
        match action {
            SchemeAction::Test => scheme.test.environment = variables,
            _ => scheme.launch.environment = variables,
        }
        repo.save(&scheme)?;

        Ok(Report::new()
            .with("scheme", scheme_name)
            .with("variables", count))
    })
}

/// Replace the command-line argument list of the launch or test action.
pub fn set_scheme_arguments(
    document: &Path,
    scheme_name: &str,
    action: &str,
    arguments: &[String],
) -> Result<Report> {
    let action = SchemeAction::parse_runnable(action)?;
    with_repo(document, |repo, _| {
        let (mut scheme, _) = repo.find(scheme_name)?;

        let arguments: Vec<CommandLineArgument> = arguments
            .iter()
            .map(|argument| CommandLineArgument {
                argument: argument.clone(),
                enabled: true,
            })
            .collect();
        let count = arguments.len();
        match action {
            SchemeAction::Test => scheme.test.arguments = arguments,
            _ => scheme.launch.arguments = arguments,
        }
        repo.save(&scheme)?;

        Ok(Report::new()
            .with("scheme", scheme_name)
            .with("arguments", count))
    })
}

/// Enable or disable test-action code coverage, optionally restricting it
/// to a set of targets. An empty restriction means cover everything.
pub fn set_scheme_coverage(
    document: &Path,
    scheme_name: &str,
    enabled: bool,
    targets: Option<&[String]>,
) -> Result<Report> {
    let container = container_name(document);
    with_repo_and_graph(document, |repo, graph| {
        let (mut scheme, _) = repo.find(scheme_name)?;

        scheme.test.code_coverage = enabled;
        match targets {
            Some(names) => {
                let mut references = Vec::with_capacity(names.len());
                for name in names {
                    let target = graph.target(name)?;
                    references.push(BuildableReference::for_target(target, &container));
                }
                scheme.test.coverage_targets = references;
            }
            None => scheme.test.coverage_targets.clear(),
        }
        let restricted = scheme.test.coverage_targets.len();
        repo.save(&scheme)?;

        tracing::debug!(scheme = scheme_name, enabled, "set scheme coverage");
        Ok(Report::new()
            .with("scheme", scheme_name)
            .with("code_coverage", enabled)
            .with("coverage_targets", restricted))
    })
}

/// Add a test target to a scheme's test action.
pub fn add_scheme_testable(
    document: &Path,
    scheme_name: &str,
    test_target: &str,
    skipped: bool,
) -> Result<Report> {
    let container = container_name(document);
    with_repo_and_graph(document, |repo, graph| {
        let (mut scheme, _) = repo.find(scheme_name)?;
        let target = graph.target(test_target)?;

        scheme.test.testables.push(TestableReference {
            skipped,
            reference: BuildableReference::for_target(target, &container),
        });
        repo.save(&scheme)?;

        tracing::debug!(scheme = scheme_name, test_target, "added testable");
        Ok(Report::new()
            .with("scheme", scheme_name)
            .with("testable", test_target)
            .with("skipped", skipped))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add_target, new_project, AddTargetOptions};
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> (TempDir, std::path::PathBuf) {
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
        add_target(
            &doc,
            &AddTargetOptions {
                name: "AppTests".to_string(),
                product_type: "unit-test".to_string(),
                bundle_id: None,
            },
        )
        .unwrap();
        (tmp, doc)
    }

    fn create(doc: &Path, name: &str, shared: bool) {
        create_scheme(
            doc,
            &CreateSchemeOptions {
                name: name.to_string(),
                target: "App".to_string(),
                test_target: Some("AppTests".to_string()),
                shared,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_create_and_list() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        create(&doc, "Dev", false);

        let listed = list_schemes(&doc).unwrap();
        assert_eq!(listed.get("count"), Some(&json!(2)));
        let schemes = listed.get("schemes").unwrap();
        assert_eq!(schemes[0]["name"], json!("App"));
        assert_eq!(schemes[0]["shared"], json!(true));
        assert_eq!(schemes[1]["shared"], json!(false));
    }

    #[test]
    fn test_create_duplicate_name() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        let err = create_scheme(
            &doc,
            &CreateSchemeOptions {
                name: "App".to_string(),
                target: "App".to_string(),
                test_target: None,
                shared: false,
            },
        )
        .unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("SchemeAlreadyExists"));
    }

    #[test]
    fn test_create_requires_target() {
        let (_tmp, doc) = project();
        let err = create_scheme(
            &doc,
            &CreateSchemeOptions {
                name: "Ghost".to_string(),
                target: "Ghost".to_string(),
                test_target: None,
                shared: true,
            },
        )
        .unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("TargetNotFound"));

        // Nothing was written.
        let listed = list_schemes(&doc).unwrap();
        assert_eq!(listed.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_info_reports_defaults() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);

        let info = get_scheme_info(&doc, "App").unwrap();
        assert_eq!(info.get("build_entries"), Some(&json!(["App", "AppTests"])));
        assert_eq!(info.get("testables"), Some(&json!(["AppTests"])));
        assert_eq!(info.get("launch_configuration"), Some(&json!("Debug")));
        assert_eq!(info.get("archive_configuration"), Some(&json!("Release")));
        assert_eq!(info.get("code_coverage"), Some(&json!(false)));
    }

    #[test]
    fn test_update_configuration_and_coverage() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        update_scheme(
            &doc,
            &UpdateSchemeOptions {
                name: "App".to_string(),
                build_configuration: Some("Release".to_string()),
                code_coverage: Some(true),
                new_name: None,
            },
        )
        .unwrap();

        let info = get_scheme_info(&doc, "App").unwrap();
        assert_eq!(info.get("launch_configuration"), Some(&json!("Release")));
        assert_eq!(info.get("test_configuration"), Some(&json!("Release")));
        assert_eq!(info.get("code_coverage"), Some(&json!(true)));
    }

    #[test]
    fn test_rename_moves_side_file() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        update_scheme(
            &doc,
            &UpdateSchemeOptions {
                name: "App".to_string(),
                new_name: Some("Main".to_string()),
                ..UpdateSchemeOptions::default()
            },
        )
        .unwrap();

        assert!(get_scheme_info(&doc, "App").is_err());
        let info = get_scheme_info(&doc, "Main").unwrap();
        assert_eq!(info.get("scheme"), Some(&json!("Main")));
        assert!(doc.join("schemes/shared/Main.scheme.xml").is_file());
        assert!(!doc.join("schemes/shared/App.scheme.xml").exists());
    }

    #[test]
    fn test_rename_onto_existing_name() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        create(&doc, "Dev", false);
        let err = update_scheme(
            &doc,
            &UpdateSchemeOptions {
                name: "Dev".to_string(),
                new_name: Some("App".to_string()),
                ..UpdateSchemeOptions::default()
            },
        )
        .unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("SchemeAlreadyExists"));
    }

    #[test]
    fn test_delete_scheme() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        delete_scheme(&doc, "App").unwrap();
        let err = delete_scheme(&doc, "App").unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("SchemeNotFound"));
    }

    #[test]
    fn test_pre_action_round_trips() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        add_scheme_action(
            &doc,
            &SchemeActionOptions {
                scheme: "App".to_string(),
                action: "build".to_string(),
                pre: true,
                title: Some("Lint".to_string()),
                script: "swiftlint".to_string(),
                shell: None,
            },
        )
        .unwrap();

        let config = Config::load(doc.parent().unwrap());
        let repo = SchemeRepo::new(&doc, config.scheme_user());
        let (scheme, _) = repo.find("App").unwrap();
        assert_eq!(scheme.build.pre_actions.len(), 1);
        assert_eq!(scheme.build.pre_actions[0].title, "Lint");
        assert_eq!(scheme.build.pre_actions[0].shell_path, "/bin/sh");
    }

    #[test]
    fn test_invalid_action_token() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        let err = add_scheme_action(
            &doc,
            &SchemeActionOptions {
                scheme: "App".to_string(),
                action: "deploy".to_string(),
                pre: true,
                title: None,
                script: "true".to_string(),
                shell: None,
            },
        )
        .unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("InvalidActionType"));
    }

    #[test]
    fn test_environment_replaces_wholesale() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        set_scheme_environment(
            &doc,
            "App",
            "launch",
            &[("API_ENV".to_string(), "staging".to_string())],
        )
        .unwrap();
        set_scheme_environment(
            &doc,
            "App",
            "launch",
            &[("API_ENV".to_string(), "production".to_string())],
        )
        .unwrap();

        let config = Config::load(doc.parent().unwrap());
        let repo = SchemeRepo::new(&doc, config.scheme_user());
        let (scheme, _) = repo.find("App").unwrap();
        assert_eq!(scheme.launch.environment.len(), 1);
        assert_eq!(scheme.launch.environment[0].value, "production");
    }

    #[test]
    fn test_environment_rejects_non_runnable_action() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        let err = set_scheme_environment(&doc, "App", "archive", &[]).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("InvalidActionType"));
    }

    #[test]
    fn test_coverage_restriction_resolves_targets() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        set_scheme_coverage(&doc, "App", true, Some(&["App".to_string()])).unwrap();

        let info = get_scheme_info(&doc, "App").unwrap();
        assert_eq!(info.get("code_coverage"), Some(&json!(true)));
        assert_eq!(info.get("coverage_targets"), Some(&json!(["App"])));

        // Clearing the restriction keeps coverage on.
        set_scheme_coverage(&doc, "App", true, None).unwrap();
        let info = get_scheme_info(&doc, "App").unwrap();
        assert_eq!(info.get("coverage_targets"), Some(&json!([])));
    }

    #[test]
    fn test_coverage_unknown_target() {
        let (_tmp, doc) = project();
        create(&doc, "App", true);
        let err =
            set_scheme_coverage(&doc, "App", true, Some(&["Ghost".to_string()])).unwrap_err();
        let kind = err.downcast_ref::<GraphError>().map(GraphError::kind);
        assert_eq!(kind, Some("TargetNotFound"));
    }

    #[test]
    fn test_add_testable() {
        let (_tmp, doc) = project();
        create_scheme(
            &doc,
            &CreateSchemeOptions {
                name: "Bare".to_string(),
                target: "App".to_string(),
                test_target: None,
                shared: true,
            },
        )
        .unwrap();
        add_scheme_testable(&doc, "Bare", "AppTests", false).unwrap();

        let info = get_scheme_info(&doc, "Bare").unwrap();
        assert_eq!(info.get("testables"), Some(&json!(["AppTests"])));
    }
}

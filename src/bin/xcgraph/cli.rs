//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// xcgraph - a structural editor for IDE project-description documents
#[derive(Parser)]
#[command(name = "xcgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project document directory
    #[arg(
        short,
        long,
        global = true,
        env = "XCGRAPH_PROJECT",
        default_value = "Project.xcgraph"
    )]
    pub project: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project document
    New(NewArgs),

    /// Group tree operations
    Group(GroupArgs),

    /// File and folder reference operations
    File(FileArgs),

    /// Build phase operations
    Phase(PhaseArgs),

    /// Target operations
    Target(TargetArgs),

    /// Build setting operations
    Setting(SettingArgs),

    /// Package reference operations
    Package(PackageArgs),

    /// Scheme operations
    Scheme(SchemeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Project name
    pub name: String,
}

#[derive(Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group under an existing parent
    Add {
        /// Group name (may itself be a slash-separated chain)
        name: String,

        /// Slash-separated path of the parent group
        #[arg(long)]
        parent: Option<String>,
    },

    /// List every group path
    List,

    /// Remove a group subtree
    Remove {
        /// Slash-separated group path
        path: String,
    },
}

#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommands,
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// Add a file reference, optionally wiring it into a target
    Add {
        /// File path, relative to the project source root
        path: String,

        /// Group path to place the reference under; created if missing
        #[arg(long)]
        group: Option<String>,

        /// Target whose build phases receive the file
        #[arg(long)]
        target: Option<String>,
    },

    /// Remove a file reference and its build-file joins
    Remove {
        /// File path or reference name
        path: String,

        /// Also delete the file from disk
        #[arg(long)]
        delete: bool,
    },

    /// Add a synced folder reference
    FolderRef {
        /// Folder path, relative to the project source root
        path: String,

        /// Group path to place the reference under; created if missing
        #[arg(long)]
        group: Option<String>,

        /// Target that consumes the folder's contents
        #[arg(long)]
        target: Option<String>,
    },

    /// List file references, project-wide or per target
    List {
        /// Restrict to files wired into this target's build phases
        #[arg(long)]
        target: Option<String>,
    },
}

#[derive(Args)]
pub struct PhaseArgs {
    #[command(subcommand)]
    pub command: PhaseCommands,
}

#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Append a build phase to a target
    Add {
        /// Target name
        target: String,

        /// Phase kind: sources, resources, frameworks, headers,
        /// copyfiles, or script
        kind: String,

        /// Display name (script and copy-files phases)
        #[arg(long)]
        name: Option<String>,

        /// Shell for script phases
        #[arg(long)]
        shell: Option<String>,

        /// Script text for script phases
        #[arg(long)]
        script: Option<String>,
    },

    /// List a target's build phases in order
    List {
        /// Target name
        target: String,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    #[command(subcommand)]
    pub command: TargetCommands,
}

#[derive(Subcommand)]
pub enum TargetCommands {
    /// Create a target with default configurations and phases
    Add {
        /// Target name
        name: String,

        /// Product type: app, framework, static-library, dynamic-library,
        /// unit-test, ui-test, app-extension, command-line-tool, or bundle
        #[arg(long, default_value = "app")]
        product_type: String,

        /// Bundle identifier to set on the default configurations
        #[arg(long)]
        bundle_id: Option<String>,
    },

    /// Remove a target and dependency edges pointing at it
    Remove {
        /// Target name
        name: String,
    },

    /// List target names
    List,

    /// Show a target's configurations, phases, and dependencies
    Info {
        /// Target name
        name: String,
    },

    /// Record a dependency edge between two targets
    Dependency {
        /// Dependent target name
        target: String,

        /// Target it depends on
        depends_on: String,
    },
}

#[derive(Args)]
pub struct SettingArgs {
    #[command(subcommand)]
    pub command: SettingCommands,
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Set a build setting on the project or a target
    Set {
        /// Setting key, e.g. SWIFT_VERSION
        key: String,

        /// Setting value
        value: String,

        /// Target to address; omitted means the project layer
        #[arg(long)]
        target: Option<String>,

        /// Configuration to address; omitted means all configurations
        #[arg(long)]
        configuration: Option<String>,
    },

    /// Read build settings from the project or a target
    Get {
        /// Target to address; omitted means the project layer
        #[arg(long)]
        target: Option<String>,

        /// Configuration to address; omitted means all configurations
        #[arg(long)]
        configuration: Option<String>,
    },

    /// List configuration names and the default
    Configurations {
        /// Target to address; omitted means the project layer
        #[arg(long)]
        target: Option<String>,
    },
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub command: PackageCommands,
}

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Add a remote package reference and attach a product to a target
    AddRemote {
        /// Repository URL
        url: String,

        /// Product name to attach
        #[arg(long)]
        product: String,

        /// Consuming target
        #[arg(long)]
        target: String,

        /// Version value interpreted under --rule
        #[arg(long)]
        version: String,

        /// Requirement rule: up-to-next-major, up-to-next-minor, exact,
        /// branch, or revision
        #[arg(long, default_value = "up-to-next-major")]
        rule: String,
    },

    /// Add a local package reference and attach a product to a target
    AddLocal {
        /// Package path, relative to the project source root
        path: PathBuf,

        /// Product name to attach
        #[arg(long)]
        product: String,

        /// Consuming target
        #[arg(long)]
        target: String,
    },

    /// List package references
    List,
}

#[derive(Args)]
pub struct SchemeArgs {
    #[command(subcommand)]
    pub command: SchemeCommands,
}

#[derive(Subcommand)]
pub enum SchemeCommands {
    /// Create a scheme with the default actions for a target
    Create {
        /// Scheme name
        name: String,

        /// Target whose product the scheme builds and launches
        #[arg(long)]
        target: String,

        /// Test-bundle target wired into the test action
        #[arg(long)]
        test_target: Option<String>,

        /// Place the scheme in the shared collection
        #[arg(long)]
        shared: bool,
    },

    /// List visible schemes
    List,

    /// Show a scheme's actions and entries
    Info {
        /// Scheme name
        name: String,
    },

    /// Update a scheme's configuration, coverage flag, or name
    Update {
        /// Scheme name
        name: String,

        /// New configuration for the launch, test, and analyze actions
        #[arg(long)]
        configuration: Option<String>,

        /// Enable or disable test-action code coverage
        #[arg(long)]
        coverage: Option<bool>,

        /// Rename the scheme
        #[arg(long)]
        rename: Option<String>,
    },

    /// Delete a scheme's side file
    Delete {
        /// Scheme name
        name: String,
    },

    /// Append a pre- or post-action shell script to an action
    Action {
        /// Scheme name
        scheme: String,

        /// Action: build, test, launch, profile, or archive
        action: String,

        /// Script text
        script: String,

        /// Run before the action instead of after it
        #[arg(long)]
        pre: bool,

        /// Action title
        #[arg(long)]
        title: Option<String>,

        /// Shell to run the script with
        #[arg(long)]
        shell: Option<String>,
    },

    /// Replace the environment variables of the launch or test action
    Env {
        /// Scheme name
        scheme: String,

        /// Action: launch or test
        action: String,

        /// KEY=VALUE pairs
        #[arg(value_parser = parse_key_value)]
        variables: Vec<(String, String)>,
    },

    /// Replace the command-line arguments of the launch or test action
    Args {
        /// Scheme name
        scheme: String,

        /// Action: launch or test
        action: String,

        /// Argument strings
        arguments: Vec<String>,
    },

    /// Configure test-action code coverage
    Coverage {
        /// Scheme name
        scheme: String,

        /// Enable or disable coverage
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        enabled: bool,

        /// Restrict coverage to these targets; omitted clears the restriction
        #[arg(long)]
        target: Option<Vec<String>>,
    },

    /// Add a test target to the test action
    Testable {
        /// Scheme name
        scheme: String,

        /// Test-bundle target name
        test_target: String,

        /// Mark the testable as skipped
        #[arg(long)]
        skipped: bool,
    },
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// Parse a KEY=VALUE environment variable pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("API_ENV=staging"),
            Ok(("API_ENV".to_string(), "staging".to_string()))
        );
        assert_eq!(
            parse_key_value("EMPTY="),
            Ok(("EMPTY".to_string(), String::new()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=orphan").is_err());
    }

    #[test]
    fn test_cli_parses_global_project_flag() {
        let cli = Cli::parse_from(["xcgraph", "target", "list", "--project", "App.xcgraph"]);
        assert_eq!(cli.project, PathBuf::from("App.xcgraph"));
    }
}

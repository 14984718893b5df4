//! Scheme documents: build/test/launch/profile/analyze/archive configuration.
//!
//! A scheme is not resident in the primary graph. It is read from and written
//! to its own side file; see [`crate::scheme`] for discovery and the codec.

use serde::{Deserialize, Serialize};

use crate::core::config::{DEBUG, RELEASE};
use crate::core::error::GraphError;
use crate::core::project::ObjectId;
use crate::core::target::Target;

/// Reference to a buildable product, derived from a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildableReference {
    /// Id of the referenced target in the primary graph.
    pub target_id: ObjectId,

    /// The target's name.
    pub target_name: String,

    /// The built artifact's file name, e.g. `App.app` or `libCore.a`.
    pub buildable_name: String,

    /// The containing document, as `container:<document name>`.
    pub container: String,
}

impl BuildableReference {
    pub fn for_target(target: &Target, container: &str) -> Self {
        BuildableReference {
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            buildable_name: target.product_type.artifact_name(&target.name),
            container: container.to_string(),
        }
    }
}

/// Which build purposes an entry participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFor {
    pub testing: bool,
    pub running: bool,
    pub profiling: bool,
    pub archiving: bool,
    pub analyzing: bool,
}

impl Default for BuildFor {
    fn default() -> Self {
        BuildFor {
            testing: true,
            running: true,
            profiling: true,
            archiving: true,
            analyzing: true,
        }
    }
}

/// One built target in the build action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEntry {
    #[serde(default)]
    pub build_for: BuildFor,
    pub reference: BuildableReference,
}

/// A pre- or post-action shell script on an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionAction {
    pub title: String,
    pub shell_path: String,
    pub script: String,
}

/// An environment variable entry for launch/test actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

/// A command-line argument entry for launch/test actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandLineArgument {
    pub argument: String,
    pub enabled: bool,
}

/// A test target participating in the test action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestableReference {
    pub skipped: bool,
    pub reference: BuildableReference,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildAction {
    pub entries: Vec<BuildEntry>,
    pub pre_actions: Vec<ExecutionAction>,
    pub post_actions: Vec<ExecutionAction>,
    pub parallelize: bool,
    pub implicit_dependencies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAction {
    pub build_configuration: String,
    pub testables: Vec<TestableReference>,
    pub environment: Vec<EnvironmentVariable>,
    pub arguments: Vec<CommandLineArgument>,
    pub code_coverage: bool,

    /// When non-empty, coverage is restricted to these targets.
    pub coverage_targets: Vec<BuildableReference>,
    pub pre_actions: Vec<ExecutionAction>,
    pub post_actions: Vec<ExecutionAction>,
}

impl Default for TestAction {
    fn default() -> Self {
        TestAction {
            build_configuration: DEBUG.to_string(),
            testables: Vec::new(),
            environment: Vec::new(),
            arguments: Vec::new(),
            code_coverage: false,
            coverage_targets: Vec::new(),
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchAction {
    pub build_configuration: String,
    pub runnable: Option<BuildableReference>,
    pub environment: Vec<EnvironmentVariable>,
    pub arguments: Vec<CommandLineArgument>,
    pub pre_actions: Vec<ExecutionAction>,
    pub post_actions: Vec<ExecutionAction>,
}

impl Default for LaunchAction {
    fn default() -> Self {
        LaunchAction {
            build_configuration: DEBUG.to_string(),
            runnable: None,
            environment: Vec::new(),
            arguments: Vec::new(),
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAction {
    pub build_configuration: String,
    pub pre_actions: Vec<ExecutionAction>,
    pub post_actions: Vec<ExecutionAction>,
}

impl Default for ProfileAction {
    fn default() -> Self {
        ProfileAction {
            build_configuration: RELEASE.to_string(),
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeAction {
    pub build_configuration: String,
}

impl Default for AnalyzeAction {
    fn default() -> Self {
        AnalyzeAction {
            build_configuration: DEBUG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveAction {
    pub build_configuration: String,
    pub reveal_in_organizer: bool,
    pub pre_actions: Vec<ExecutionAction>,
    pub post_actions: Vec<ExecutionAction>,
}

impl Default for ArchiveAction {
    fn default() -> Self {
        ArchiveAction {
            build_configuration: RELEASE.to_string(),
            reveal_in_organizer: true,
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
        }
    }
}

/// Actions that accept pre/post execution actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeAction {
    Build,
    Test,
    Launch,
    Profile,
    Archive,
}

impl SchemeAction {
    /// Parse an action-type token; anything else is an invalid input.
    pub fn parse(token: &str) -> Result<Self, GraphError> {
        match token.to_lowercase().as_str() {
            "build" => Ok(SchemeAction::Build),
            "test" => Ok(SchemeAction::Test),
            "launch" | "run" => Ok(SchemeAction::Launch),
            "profile" => Ok(SchemeAction::Profile),
            "archive" => Ok(SchemeAction::Archive),
            _ => Err(GraphError::InvalidActionType {
                token: token.to_string(),
            }),
        }
    }

    /// Parse a token naming an action that carries environment variables and
    /// command-line arguments (launch or test only).
    pub fn parse_runnable(token: &str) -> Result<Self, GraphError> {
        match Self::parse(token)? {
            action @ (SchemeAction::Launch | SchemeAction::Test) => Ok(action),
            _ => Err(GraphError::InvalidActionType {
                token: token.to_string(),
            }),
        }
    }
}

/// A named bundle of build/test/launch/profile/analyze/archive configuration,
/// persisted as its own document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheme {
    pub name: String,

    /// Shared schemes live in the shared collection, user schemes in a
    /// per-user collection. Not serialized into the side file; it is implied
    /// by the file's location.
    #[serde(skip)]
    pub shared: bool,

    pub build: BuildAction,
    pub test: TestAction,
    pub launch: LaunchAction,
    pub profile: ProfileAction,
    pub analyze: AnalyzeAction,
    pub archive: ArchiveAction,
}

impl Scheme {
    /// Synthesize the default six actions for a target (and optional test
    /// target), with the buildable reference derived from the target's name
    /// and product-type-specific file extension.
    pub fn new(
        name: impl Into<String>,
        shared: bool,
        target: &Target,
        test_target: Option<&Target>,
        container: &str,
    ) -> Self {
        let reference = BuildableReference::for_target(target, container);

        let mut build = BuildAction {
            parallelize: true,
            implicit_dependencies: true,
            ..BuildAction::default()
        };
        build.entries.push(BuildEntry {
            build_for: BuildFor::default(),
            reference: reference.clone(),
        });

        let mut test = TestAction::default();
        if let Some(test_target) = test_target {
            let test_ref = BuildableReference::for_target(test_target, container);
            build.entries.push(BuildEntry {
                build_for: BuildFor {
                    running: false,
                    profiling: false,
                    archiving: false,
                    analyzing: false,
                    testing: true,
                },
                reference: test_ref.clone(),
            });
            test.testables.push(TestableReference {
                skipped: false,
                reference: test_ref,
            });
        }

        let launch = LaunchAction {
            runnable: Some(reference),
            ..LaunchAction::default()
        };

        Scheme {
            name: name.into(),
            shared,
            build,
            test,
            launch,
            profile: ProfileAction::default(),
            analyze: AnalyzeAction::default(),
            archive: ArchiveAction::default(),
        }
    }

    /// Change the build configuration used by the launch, test, and analyze
    /// actions.
    pub fn set_build_configuration(&mut self, configuration: &str) {
        self.launch.build_configuration = configuration.to_string();
        self.test.build_configuration = configuration.to_string();
        self.analyze.build_configuration = configuration.to_string();
    }

    /// Append a pre- or post-action to one of the five accepting actions.
    pub fn push_execution_action(&mut self, action: SchemeAction, pre: bool, exec: ExecutionAction) {
        let (pre_list, post_list) = match action {
            SchemeAction::Build => (&mut self.build.pre_actions, &mut self.build.post_actions),
            SchemeAction::Test => (&mut self.test.pre_actions, &mut self.test.post_actions),
            SchemeAction::Launch => (&mut self.launch.pre_actions, &mut self.launch.post_actions),
            SchemeAction::Profile => {
                (&mut self.profile.pre_actions, &mut self.profile.post_actions)
            }
            SchemeAction::Archive => {
                (&mut self.archive.pre_actions, &mut self.archive.post_actions)
            }
        };
        if pre {
            pre_list.push(exec);
        } else {
            post_list.push(exec);
        }
    }
}

//! Scheme side-file codec.
//!
//! Schemes serialize to an XML document independent of the primary graph
//! file. Attribute booleans use YES/NO, and element order is fixed so that
//! repeated serialization of an unchanged scheme is byte-identical.

use std::collections::BTreeMap;
use std::io::Cursor;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::core::scheme::{
    BuildAction, BuildEntry, BuildFor, BuildableReference, CommandLineArgument,
    EnvironmentVariable, ExecutionAction, Scheme, SchemeAction, TestableReference,
};

const SCHEME_VERSION: &str = "1.7";

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_buildable(writer: &mut XmlWriter, reference: &BuildableReference) -> Result<()> {
    let mut el = BytesStart::new("BuildableReference");
    el.push_attribute(("BuildableIdentifier", "primary"));
    el.push_attribute(("BlueprintIdentifier", reference.target_id.as_str()));
    el.push_attribute(("BuildableName", reference.buildable_name.as_str()));
    el.push_attribute(("BlueprintName", reference.target_name.as_str()));
    el.push_attribute(("ReferencedContainer", reference.container.as_str()));
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_execution_actions(
    writer: &mut XmlWriter,
    tag: &str,
    actions: &[ExecutionAction],
) -> Result<()> {
    if actions.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for action in actions {
        let mut el = BytesStart::new("ExecutionAction");
        el.push_attribute(("title", action.title.as_str()));
        el.push_attribute(("shellPath", action.shell_path.as_str()));
        el.push_attribute(("scriptText", action.script.as_str()));
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_environment(writer: &mut XmlWriter, env: &[EnvironmentVariable]) -> Result<()> {
    if env.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("EnvironmentVariables")))?;
    for var in env {
        let mut el = BytesStart::new("EnvironmentVariable");
        el.push_attribute(("key", var.key.as_str()));
        el.push_attribute(("value", var.value.as_str()));
        el.push_attribute(("isEnabled", yes_no(var.enabled)));
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("EnvironmentVariables")))?;
    Ok(())
}

fn write_arguments(writer: &mut XmlWriter, args: &[CommandLineArgument]) -> Result<()> {
    if args.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("CommandLineArguments")))?;
    for arg in args {
        let mut el = BytesStart::new("CommandLineArgument");
        el.push_attribute(("argument", arg.argument.as_str()));
        el.push_attribute(("isEnabled", yes_no(arg.enabled)));
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("CommandLineArguments")))?;
    Ok(())
}

fn write_build_action(writer: &mut XmlWriter, build: &BuildAction) -> Result<()> {
    let mut el = BytesStart::new("BuildAction");
    el.push_attribute(("parallelizeBuildables", yes_no(build.parallelize)));
    el.push_attribute(("buildImplicitDependencies", yes_no(build.implicit_dependencies)));
    writer.write_event(Event::Start(el))?;

    write_execution_actions(writer, "PreActions", &build.pre_actions)?;
    write_execution_actions(writer, "PostActions", &build.post_actions)?;

    writer.write_event(Event::Start(BytesStart::new("BuildActionEntries")))?;
    for entry in &build.entries {
        let mut el = BytesStart::new("BuildActionEntry");
        el.push_attribute(("buildForTesting", yes_no(entry.build_for.testing)));
        el.push_attribute(("buildForRunning", yes_no(entry.build_for.running)));
        el.push_attribute(("buildForProfiling", yes_no(entry.build_for.profiling)));
        el.push_attribute(("buildForArchiving", yes_no(entry.build_for.archiving)));
        el.push_attribute(("buildForAnalyzing", yes_no(entry.build_for.analyzing)));
        writer.write_event(Event::Start(el))?;
        write_buildable(writer, &entry.reference)?;
        writer.write_event(Event::End(BytesEnd::new("BuildActionEntry")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("BuildActionEntries")))?;

    writer.write_event(Event::End(BytesEnd::new("BuildAction")))?;
    Ok(())
}

/// Serialize a scheme to its side-file document.
pub fn to_xml(scheme: &Scheme) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("Scheme");
    root.push_attribute(("version", SCHEME_VERSION));
    writer.write_event(Event::Start(root))?;

    write_build_action(&mut writer, &scheme.build)?;

    // TestAction
    let test = &scheme.test;
    let mut el = BytesStart::new("TestAction");
    el.push_attribute(("buildConfiguration", test.build_configuration.as_str()));
    el.push_attribute(("codeCoverageEnabled", yes_no(test.code_coverage)));
    if !test.coverage_targets.is_empty() {
        el.push_attribute(("onlyGenerateCoverageForSpecifiedTargets", "YES"));
    }
    writer.write_event(Event::Start(el))?;
    write_execution_actions(&mut writer, "PreActions", &test.pre_actions)?;
    write_execution_actions(&mut writer, "PostActions", &test.post_actions)?;
    writer.write_event(Event::Start(BytesStart::new("Testables")))?;
    for testable in &test.testables {
        let mut el = BytesStart::new("TestableReference");
        el.push_attribute(("skipped", yes_no(testable.skipped)));
        writer.write_event(Event::Start(el))?;
        write_buildable(&mut writer, &testable.reference)?;
        writer.write_event(Event::End(BytesEnd::new("TestableReference")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Testables")))?;
    write_environment(&mut writer, &test.environment)?;
    write_arguments(&mut writer, &test.arguments)?;
    if !test.coverage_targets.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("CodeCoverageTargets")))?;
        for reference in &test.coverage_targets {
            write_buildable(&mut writer, reference)?;
        }
        writer.write_event(Event::End(BytesEnd::new("CodeCoverageTargets")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("TestAction")))?;

    // LaunchAction
    let launch = &scheme.launch;
    let mut el = BytesStart::new("LaunchAction");
    el.push_attribute(("buildConfiguration", launch.build_configuration.as_str()));
    writer.write_event(Event::Start(el))?;
    write_execution_actions(&mut writer, "PreActions", &launch.pre_actions)?;
    write_execution_actions(&mut writer, "PostActions", &launch.post_actions)?;
    if let Some(runnable) = &launch.runnable {
        writer.write_event(Event::Start(BytesStart::new("BuildableProductRunnable")))?;
        write_buildable(&mut writer, runnable)?;
        writer.write_event(Event::End(BytesEnd::new("BuildableProductRunnable")))?;
    }
    write_environment(&mut writer, &launch.environment)?;
    write_arguments(&mut writer, &launch.arguments)?;
    writer.write_event(Event::End(BytesEnd::new("LaunchAction")))?;

    // ProfileAction
    let profile = &scheme.profile;
    let mut el = BytesStart::new("ProfileAction");
    el.push_attribute(("buildConfiguration", profile.build_configuration.as_str()));
    if profile.pre_actions.is_empty() && profile.post_actions.is_empty() {
        writer.write_event(Event::Empty(el))?;
    } else {
        writer.write_event(Event::Start(el))?;
        write_execution_actions(&mut writer, "PreActions", &profile.pre_actions)?;
        write_execution_actions(&mut writer, "PostActions", &profile.post_actions)?;
        writer.write_event(Event::End(BytesEnd::new("ProfileAction")))?;
    }

    // AnalyzeAction
    let mut el = BytesStart::new("AnalyzeAction");
    el.push_attribute(("buildConfiguration", scheme.analyze.build_configuration.as_str()));
    writer.write_event(Event::Empty(el))?;

    // ArchiveAction
    let archive = &scheme.archive;
    let mut el = BytesStart::new("ArchiveAction");
    el.push_attribute(("buildConfiguration", archive.build_configuration.as_str()));
    el.push_attribute(("revealArchiveInOrganizer", yes_no(archive.reveal_in_organizer)));
    if archive.pre_actions.is_empty() && archive.post_actions.is_empty() {
        writer.write_event(Event::Empty(el))?;
    } else {
        writer.write_event(Event::Start(el))?;
        write_execution_actions(&mut writer, "PreActions", &archive.pre_actions)?;
        write_execution_actions(&mut writer, "PostActions", &archive.post_actions)?;
        writer.write_event(Event::End(BytesEnd::new("ArchiveAction")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Scheme")))?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).context("scheme document is not valid UTF-8")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Build,
    Test,
    Launch,
    Profile,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListCtx {
    None,
    Pre,
    Post,
    Entries,
    Testables,
    Coverage,
    Runnable,
}

struct SchemeParser {
    scheme: Scheme,
    section: Section,
    list: ListCtx,
    pending_build_for: Option<BuildFor>,
    pending_skipped: Option<bool>,
}

fn attr_map(el: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for attr in el.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn flag(map: &BTreeMap<String, String>, key: &str, default: bool) -> bool {
    map.get(key).map(|v| v == "YES").unwrap_or(default)
}

fn string(map: &BTreeMap<String, String>, key: &str) -> String {
    map.get(key).cloned().unwrap_or_default()
}

impl SchemeParser {
    fn new(name: &str) -> Self {
        SchemeParser {
            scheme: Scheme {
                name: name.to_string(),
                shared: false,
                build: BuildAction::default(),
                test: Default::default(),
                launch: Default::default(),
                profile: Default::default(),
                analyze: Default::default(),
                archive: Default::default(),
            },
            section: Section::None,
            list: ListCtx::None,
            pending_build_for: None,
            pending_skipped: None,
        }
    }

    fn open(&mut self, el: &BytesStart<'_>, entering: bool) -> Result<()> {
        let attrs = attr_map(el)?;
        match el.name().as_ref() {
            b"Scheme" => {}
            b"BuildAction" => {
                self.scheme.build.parallelize = flag(&attrs, "parallelizeBuildables", false);
                self.scheme.build.implicit_dependencies =
                    flag(&attrs, "buildImplicitDependencies", false);
                if entering {
                    self.section = Section::Build;
                }
            }
            b"TestAction" => {
                self.scheme.test.build_configuration = string(&attrs, "buildConfiguration");
                self.scheme.test.code_coverage = flag(&attrs, "codeCoverageEnabled", false);
                if entering {
                    self.section = Section::Test;
                }
            }
            b"LaunchAction" => {
                self.scheme.launch.build_configuration = string(&attrs, "buildConfiguration");
                if entering {
                    self.section = Section::Launch;
                }
            }
            b"ProfileAction" => {
                self.scheme.profile.build_configuration = string(&attrs, "buildConfiguration");
                if entering {
                    self.section = Section::Profile;
                }
            }
            b"AnalyzeAction" => {
                self.scheme.analyze.build_configuration = string(&attrs, "buildConfiguration");
            }
            b"ArchiveAction" => {
                self.scheme.archive.build_configuration = string(&attrs, "buildConfiguration");
                self.scheme.archive.reveal_in_organizer =
                    flag(&attrs, "revealArchiveInOrganizer", true);
                if entering {
                    self.section = Section::Archive;
                }
            }
            b"PreActions" if entering => self.list = ListCtx::Pre,
            b"PostActions" if entering => self.list = ListCtx::Post,
            b"BuildActionEntries" if entering => self.list = ListCtx::Entries,
            b"Testables" if entering => self.list = ListCtx::Testables,
            b"CodeCoverageTargets" if entering => self.list = ListCtx::Coverage,
            b"BuildableProductRunnable" if entering => self.list = ListCtx::Runnable,
            b"BuildActionEntry" => {
                self.pending_build_for = Some(BuildFor {
                    testing: flag(&attrs, "buildForTesting", true),
                    running: flag(&attrs, "buildForRunning", true),
                    profiling: flag(&attrs, "buildForProfiling", true),
                    archiving: flag(&attrs, "buildForArchiving", true),
                    analyzing: flag(&attrs, "buildForAnalyzing", true),
                });
            }
            b"TestableReference" => {
                self.pending_skipped = Some(flag(&attrs, "skipped", false));
            }
            b"ExecutionAction" => self.push_execution(&attrs),
            b"EnvironmentVariable" => {
                let var = EnvironmentVariable {
                    key: string(&attrs, "key"),
                    value: string(&attrs, "value"),
                    enabled: flag(&attrs, "isEnabled", true),
                };
                match self.section {
                    Section::Test => self.scheme.test.environment.push(var),
                    Section::Launch => self.scheme.launch.environment.push(var),
                    _ => {}
                }
            }
            b"CommandLineArgument" => {
                let arg = CommandLineArgument {
                    argument: string(&attrs, "argument"),
                    enabled: flag(&attrs, "isEnabled", true),
                };
                match self.section {
                    Section::Test => self.scheme.test.arguments.push(arg),
                    Section::Launch => self.scheme.launch.arguments.push(arg),
                    _ => {}
                }
            }
            b"BuildableReference" => self.push_buildable(&attrs),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"BuildAction" | b"TestAction" | b"LaunchAction" | b"ProfileAction"
            | b"ArchiveAction" => self.section = Section::None,
            b"PreActions" | b"PostActions" | b"BuildActionEntries" | b"Testables"
            | b"CodeCoverageTargets" | b"BuildableProductRunnable" => self.list = ListCtx::None,
            b"BuildActionEntry" => self.pending_build_for = None,
            b"TestableReference" => self.pending_skipped = None,
            _ => {}
        }
    }

    fn push_execution(&mut self, attrs: &BTreeMap<String, String>) {
        let exec = ExecutionAction {
            title: string(attrs, "title"),
            shell_path: string(attrs, "shellPath"),
            script: string(attrs, "scriptText"),
        };
        let action = match self.section {
            Section::Build => SchemeAction::Build,
            Section::Test => SchemeAction::Test,
            Section::Launch => SchemeAction::Launch,
            Section::Profile => SchemeAction::Profile,
            Section::Archive => SchemeAction::Archive,
            Section::None => return,
        };
        let pre = self.list == ListCtx::Pre;
        self.scheme.push_execution_action(action, pre, exec);
    }

    fn push_buildable(&mut self, attrs: &BTreeMap<String, String>) {
        let reference = BuildableReference {
            target_id: string(attrs, "BlueprintIdentifier"),
            target_name: string(attrs, "BlueprintName"),
            buildable_name: string(attrs, "BuildableName"),
            container: string(attrs, "ReferencedContainer"),
        };
        match self.list {
            ListCtx::Entries => {
                let build_for = self.pending_build_for.take().unwrap_or_default();
                self.scheme.build.entries.push(BuildEntry {
                    build_for,
                    reference,
                });
            }
            ListCtx::Testables => {
                let skipped = self.pending_skipped.take().unwrap_or(false);
                self.scheme.test.testables.push(TestableReference {
                    skipped,
                    reference,
                });
            }
            ListCtx::Coverage => self.scheme.test.coverage_targets.push(reference),
            ListCtx::Runnable => self.scheme.launch.runnable = Some(reference),
            _ => {}
        }
    }
}

/// Parse a scheme side-file document. The scheme's name is not stored in the
/// document; it comes from the file name.
pub fn from_xml(xml: &str, name: &str) -> Result<Scheme> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = SchemeParser::new(name);
    loop {
        match reader
            .read_event()
            .with_context(|| format!("malformed scheme document for `{}`", name))?
        {
            Event::Eof => break,
            Event::Start(el) => parser.open(&el, true)?,
            Event::Empty(el) => parser.open(&el, false)?,
            Event::End(el) => parser.close(el.name().as_ref()),
            _ => {}
        }
    }
    Ok(parser.scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigurationList;
    use crate::core::scheme::Scheme;
    use crate::core::target::{ProductType, Target};

    fn target(name: &str, ty: ProductType) -> Target {
        let mut next = 0;
        Target::new(
            format!("OBJ-{name}"),
            name,
            ty,
            ConfigurationList::standard_target(None),
            &mut next,
        )
    }

    fn sample_scheme() -> Scheme {
        let app = target("App", ProductType::Application);
        let tests = target("AppTests", ProductType::UnitTestBundle);
        let mut scheme = Scheme::new("App", true, &app, Some(&tests), "container:App.xcgraph");
        scheme.test.code_coverage = true;
        scheme.launch.environment.push(EnvironmentVariable {
            key: "API_URL".to_string(),
            value: "https://staging.example.com".to_string(),
            enabled: true,
        });
        scheme.launch.arguments.push(CommandLineArgument {
            argument: "--debug-menu".to_string(),
            enabled: false,
        });
        scheme.push_execution_action(
            SchemeAction::Build,
            true,
            ExecutionAction {
                title: "Generate Version".to_string(),
                shell_path: "/bin/sh".to_string(),
                script: "echo \"v1\" > version.txt".to_string(),
            },
        );
        scheme
    }

    #[test]
    fn test_round_trip() {
        let scheme = sample_scheme();
        let xml = to_xml(&scheme).unwrap();
        let parsed = from_xml(&xml, "App").unwrap();

        assert_eq!(parsed.name, "App");
        assert_eq!(parsed.build.entries.len(), 2);
        assert_eq!(parsed.build.entries[0].reference.buildable_name, "App.app");
        assert!(parsed.build.entries[0].build_for.running);
        assert!(!parsed.build.entries[1].build_for.running);
        assert_eq!(parsed.build.pre_actions.len(), 1);
        assert_eq!(parsed.build.pre_actions[0].title, "Generate Version");
        assert!(parsed.test.code_coverage);
        assert_eq!(parsed.test.testables.len(), 1);
        assert_eq!(parsed.launch.environment.len(), 1);
        assert_eq!(parsed.launch.environment[0].key, "API_URL");
        assert_eq!(parsed.launch.arguments.len(), 1);
        assert!(!parsed.launch.arguments[0].enabled);
        assert_eq!(
            parsed.launch.runnable.as_ref().map(|r| r.buildable_name.as_str()),
            Some("App.app")
        );
        assert_eq!(parsed.archive.build_configuration, "Release");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let scheme = sample_scheme();
        assert_eq!(to_xml(&scheme).unwrap(), to_xml(&scheme).unwrap());
    }

    #[test]
    fn test_attribute_escaping_round_trips() {
        let app = target("App", ProductType::Application);
        let mut scheme = Scheme::new("App", true, &app, None, "container:App.xcgraph");
        scheme.push_execution_action(
            SchemeAction::Launch,
            false,
            ExecutionAction {
                title: "Notify <ops> & friends".to_string(),
                shell_path: "/bin/sh".to_string(),
                script: "echo \"done\" && curl 'http://x?a=1&b=2'".to_string(),
            },
        );
        let xml = to_xml(&scheme).unwrap();
        let parsed = from_xml(&xml, "App").unwrap();
        assert_eq!(parsed.launch.post_actions[0].title, "Notify <ops> & friends");
        assert!(parsed.launch.post_actions[0].script.contains("&&"));
    }

    #[test]
    fn test_coverage_targets_section() {
        let app = target("App", ProductType::Application);
        let core = target("Core", ProductType::Framework);
        let mut scheme = Scheme::new("App", true, &app, None, "container:App.xcgraph");
        scheme.test.code_coverage = true;
        scheme
            .test
            .coverage_targets
            .push(BuildableReference::for_target(&core, "container:App.xcgraph"));

        let xml = to_xml(&scheme).unwrap();
        assert!(xml.contains("onlyGenerateCoverageForSpecifiedTargets=\"YES\""));
        let parsed = from_xml(&xml, "App").unwrap();
        assert_eq!(parsed.test.coverage_targets.len(), 1);
        assert_eq!(parsed.test.coverage_targets[0].target_name, "Core");
    }
}

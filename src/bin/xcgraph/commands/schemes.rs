//! `xcgraph scheme` commands

use anyhow::Result;

use crate::cli::SchemeCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{
    add_scheme_action, add_scheme_testable, create_scheme, delete_scheme, get_scheme_info,
    list_schemes, set_scheme_arguments, set_scheme_coverage, set_scheme_environment,
    update_scheme, CreateSchemeOptions, SchemeActionOptions, UpdateSchemeOptions,
};

pub fn execute(command: SchemeCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        SchemeCommands::Create {
            name,
            target,
            test_target,
            shared,
        } => create_scheme(
            &global.project,
            &CreateSchemeOptions {
                name,
                target,
                test_target,
                shared,
            },
        )?,
        SchemeCommands::List => list_schemes(&global.project)?,
        SchemeCommands::Info { name } => get_scheme_info(&global.project, &name)?,
        SchemeCommands::Update {
            name,
            configuration,
            coverage,
            rename,
        } => update_scheme(
            &global.project,
            &UpdateSchemeOptions {
                name,
                build_configuration: configuration,
                code_coverage: coverage,
                new_name: rename,
            },
        )?,
        SchemeCommands::Delete { name } => delete_scheme(&global.project, &name)?,
        SchemeCommands::Action {
            scheme,
            action,
            script,
            pre,
            title,
            shell,
        } => add_scheme_action(
            &global.project,
            &SchemeActionOptions {
                scheme,
                action,
                pre,
                title,
                script,
                shell,
            },
        )?,
        SchemeCommands::Env {
            scheme,
            action,
            variables,
        } => set_scheme_environment(&global.project, &scheme, &action, &variables)?,
        SchemeCommands::Args {
            scheme,
            action,
            arguments,
        } => set_scheme_arguments(&global.project, &scheme, &action, &arguments)?,
        SchemeCommands::Coverage {
            scheme,
            enabled,
            target,
        } => set_scheme_coverage(&global.project, &scheme, enabled, target.as_deref())?,
        SchemeCommands::Testable {
            scheme,
            test_target,
            skipped,
        } => add_scheme_testable(&global.project, &scheme, &test_target, skipped)?,
    };
    emit(&report, global)
}

//! `xcgraph setting` commands

use anyhow::Result;

use crate::cli::SettingCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{get_build_settings, list_configurations, update_build_setting};

pub fn execute(command: SettingCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        SettingCommands::Set {
            key,
            value,
            target,
            configuration,
        } => update_build_setting(
            &global.project,
            &key,
            &value,
            target.as_deref(),
            configuration.as_deref(),
        )?,
        SettingCommands::Get {
            target,
            configuration,
        } => get_build_settings(&global.project, target.as_deref(), configuration.as_deref())?,
        SettingCommands::Configurations { target } => {
            list_configurations(&global.project, target.as_deref())?
        }
    };
    emit(&report, global)
}

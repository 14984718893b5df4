//! `xcgraph group` commands

use anyhow::Result;

use crate::cli::GroupCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{add_group, list_groups, remove_group};

pub fn execute(command: GroupCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        GroupCommands::Add { name, parent } => {
            add_group(&global.project, &name, parent.as_deref())?
        }
        GroupCommands::List => list_groups(&global.project)?,
        GroupCommands::Remove { path } => remove_group(&global.project, &path)?,
    };
    emit(&report, global)
}

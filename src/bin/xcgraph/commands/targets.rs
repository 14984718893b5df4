//! `xcgraph target` commands

use anyhow::Result;

use crate::cli::TargetCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{
    add_target, add_target_dependency, get_target_info, list_targets, remove_target,
    AddTargetOptions,
};

pub fn execute(command: TargetCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        TargetCommands::Add {
            name,
            product_type,
            bundle_id,
        } => add_target(
            &global.project,
            &AddTargetOptions {
                name,
                product_type,
                bundle_id,
            },
        )?,
        TargetCommands::Remove { name } => remove_target(&global.project, &name)?,
        TargetCommands::List => list_targets(&global.project)?,
        TargetCommands::Info { name } => get_target_info(&global.project, &name)?,
        TargetCommands::Dependency { target, depends_on } => {
            add_target_dependency(&global.project, &target, &depends_on)?
        }
    };
    emit(&report, global)
}

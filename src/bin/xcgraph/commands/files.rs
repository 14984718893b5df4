//! `xcgraph file` commands

use anyhow::Result;

use crate::cli::FileCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{add_file, add_folder_reference, list_files, remove_file, AddFileOptions};

pub fn execute(command: FileCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        FileCommands::Add {
            path,
            group,
            target,
        } => add_file(
            &global.project,
            &AddFileOptions {
                path,
                group,
                target,
            },
        )?,
        FileCommands::Remove { path, delete } => remove_file(&global.project, &path, delete)?,
        FileCommands::FolderRef {
            path,
            group,
            target,
        } => add_folder_reference(
            &global.project,
            &path,
            group.as_deref(),
            target.as_deref(),
        )?,
        FileCommands::List { target } => list_files(&global.project, target.as_deref())?,
    };
    emit(&report, global)
}

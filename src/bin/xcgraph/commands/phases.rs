//! `xcgraph phase` commands

use anyhow::Result;

use crate::cli::PhaseCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{add_build_phase, list_build_phases, AddBuildPhaseOptions};

pub fn execute(command: PhaseCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        PhaseCommands::Add {
            target,
            kind,
            name,
            shell,
            script,
        } => add_build_phase(
            &global.project,
            &AddBuildPhaseOptions {
                target,
                kind,
                name,
                shell,
                script,
            },
        )?,
        PhaseCommands::List { target } => list_build_phases(&global.project, &target)?,
    };
    emit(&report, global)
}

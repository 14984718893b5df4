//! `xcgraph package` commands

use anyhow::Result;

use crate::cli::PackageCommands;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::{add_local_package, add_remote_package, list_packages, RemotePackageOptions};

pub fn execute(command: PackageCommands, global: &GlobalOptions) -> Result<()> {
    let report = match command {
        PackageCommands::AddRemote {
            url,
            product,
            target,
            version,
            rule,
        } => add_remote_package(
            &global.project,
            &RemotePackageOptions {
                url,
                product,
                target,
                version,
                rule,
            },
        )?,
        PackageCommands::AddLocal {
            path,
            product,
            target,
        } => add_local_package(&global.project, &path, &product, &target)?,
        PackageCommands::List => list_packages(&global.project)?,
    };
    emit(&report, global)
}

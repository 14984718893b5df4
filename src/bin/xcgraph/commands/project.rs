//! `xcgraph new` command

use anyhow::Result;

use crate::cli::NewArgs;
use crate::commands::emit;
use crate::GlobalOptions;
use xcgraph::ops::new_project;

pub fn execute(args: NewArgs, global: &GlobalOptions) -> Result<()> {
    let report = new_project(&global.project, &args.name)?;
    emit(&report, global)
}

//! Command implementations

pub mod completions;
pub mod files;
pub mod groups;
pub mod packages;
pub mod phases;
pub mod project;
pub mod schemes;
pub mod settings;
pub mod targets;

use anyhow::Result;

use crate::GlobalOptions;
use xcgraph::Report;

/// Print an operation report: pretty JSON in `--json` mode, otherwise one
/// `key: value` line per entry.
pub fn emit(report: &Report, global: &GlobalOptions) -> Result<()> {
    if global.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

//! xcgraph CLI - a structural editor for IDE project-description documents

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xcgraph::GraphError;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Global flags every command receives.
pub struct GlobalOptions {
    pub project: PathBuf,
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("xcgraph=debug")
    } else {
        EnvFilter::new("xcgraph=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = GlobalOptions {
        project: cli.project,
        json: cli.json,
    };

    if let Err(e) = run(cli.command, &global) {
        report_error(&e, global.json);
        std::process::exit(1);
    }
}

fn run(command: Commands, global: &GlobalOptions) -> Result<()> {
    match command {
        Commands::New(args) => commands::project::execute(args, global),
        Commands::Group(args) => commands::groups::execute(args.command, global),
        Commands::File(args) => commands::files::execute(args.command, global),
        Commands::Phase(args) => commands::phases::execute(args.command, global),
        Commands::Target(args) => commands::targets::execute(args.command, global),
        Commands::Setting(args) => commands::settings::execute(args.command, global),
        Commands::Package(args) => commands::packages::execute(args.command, global),
        Commands::Scheme(args) => commands::schemes::execute(args.command, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print a failure. In JSON mode the error goes to stdout as a structured
/// object with a stable kind token; otherwise the full anyhow chain goes to
/// stderr.
fn report_error(e: &anyhow::Error, json: bool) {
    if json {
        let kind = e
            .downcast_ref::<GraphError>()
            .map(GraphError::kind)
            .unwrap_or("Error");
        let body = serde_json::json!({
            "error": { "kind": kind, "message": format!("{:#}", e) }
        });
        println!("{}", body);
    } else {
        eprintln!("error: {:#}", e);
    }
}

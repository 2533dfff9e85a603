//! ReqDelta CLI entry point.
//!
//! Compares a project branch against the main branch and publishes the
//! annotated requirement changes as a single page.

use anyhow::Result;
use clap::Parser;

use reqdelta::application::config::ProjectConfig;
use reqdelta::application::project::run_project;

#[derive(Parser, Debug)]
#[command(name = "reqdelta")]
#[command(version)]
#[command(
    about = "Publishes an annotated view of requirement changes between two branches",
    long_about = None
)]
struct Args {
    /// Main branch to compare against
    #[arg()]
    main: String,

    /// Project branch holding the changes
    #[arg()]
    project: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ProjectConfig::default();
    run_project(&config, &args.main, &args.project)
}

//! CLI command definitions and dispatch.

mod create;
mod inspect;
mod version;

use clap::{Parser, Subcommand};

/// Docker Fixture — synthesizes `docker save` archives for tests.
#[derive(Parser)]
#[command(name = "docker-fixture", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Build a docker archive fixture
    Create(create::CreateArgs),
    /// Show the contents of a docker archive
    Inspect(inspect::InspectArgs),
    /// Show version information
    Version(version::VersionArgs),
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Create(args) => create::execute(args).await,
        Command::Inspect(args) => inspect::execute(args).await,
        Command::Version(args) => version::execute(args).await,
    }
}

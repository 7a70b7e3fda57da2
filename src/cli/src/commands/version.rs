//! `docker-fixture version` command.

use clap::Args;

#[derive(Args)]
pub struct VersionArgs;

pub async fn execute(_args: VersionArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("docker-fixture version {}", docker_fixture_core::VERSION);
    Ok(())
}

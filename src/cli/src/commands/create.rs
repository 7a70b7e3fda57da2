//! `docker-fixture create` command — Build a docker archive fixture.
//!
//! Writes `<directory>/<name>.tar` in the `docker save` layout, ready to be
//! loaded by image-handling code under test.

use std::path::PathBuf;

use clap::Args;
use docker_fixture_core::{FixtureConfig, FixtureError, ImageDescriptor};
use docker_fixture_runtime::DockerArchive;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Image name; the archive is written as <NAME>.tar
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to write the archive into (created if missing)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Entrypoint as a JSON fragment (e.g. '["sh", "-c"]')
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Cmd as a JSON fragment (e.g. '["echo", "hi"]')
    #[arg(long)]
    pub cmd: Option<String>,

    /// Image environment entry (KEY=VALUE); replaces the defaults
    #[arg(short, long = "env", value_parser = crate::output::parse_env_var)]
    pub env: Vec<String>,

    /// Host file to copy into the layer rootfs at the same path
    #[arg(long = "host-file")]
    pub host_files: Vec<PathBuf>,

    /// Configuration file (YAML or JSON); flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    tracing::debug!(
        directory = %config.directory.display(),
        image = %config.image.name,
        host_files = config.host_files.len(),
        "Resolved fixture configuration"
    );

    let archive = DockerArchive::from_config(&config).create().await?;

    let size = std::fs::metadata(&archive).map(|m| m.len()).unwrap_or(0);
    println!(
        "Created {} ({})",
        archive.display(),
        crate::output::format_bytes(size)
    );
    Ok(())
}

/// Merge the optional configuration file with command-line flags.
pub(crate) fn resolve_config(args: CreateArgs) -> Result<FixtureConfig, FixtureError> {
    let mut config = match &args.config {
        Some(path) => FixtureConfig::from_file(path)?,
        None => {
            let name = args.name.clone().ok_or_else(|| {
                FixtureError::ConfigError("--name is required without --config".to_string())
            })?;
            let directory = args.directory.clone().ok_or_else(|| {
                FixtureError::ConfigError("--directory is required without --config".to_string())
            })?;
            FixtureConfig::new(directory, ImageDescriptor::new(name))
        }
    };

    if let Some(name) = args.name {
        config.image.name = name;
    }
    if let Some(directory) = args.directory {
        config.directory = directory;
    }
    if let Some(entrypoint) = args.entrypoint {
        config.image.entrypoint = entrypoint;
    }
    if let Some(cmd) = args.cmd {
        config.image.cmd = cmd;
    }
    if !args.env.is_empty() {
        config.image.environment = args.env;
    }
    config.host_files.extend(args.host_files);

    config.validate()?;
    Ok(config)
}

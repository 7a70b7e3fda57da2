//! `docker-fixture inspect` command — Show what a docker archive contains.

use std::path::PathBuf;

use clap::Args;
use docker_fixture_runtime::ArchiveContents;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Archive to inspect (e.g. "alpine.tar")
    pub archive: PathBuf,

    /// Include the entry lists of the archive and the layer
    #[arg(long)]
    pub entries: bool,
}

pub async fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let contents = ArchiveContents::read(&args.archive)?;
    println!("{}", render(&contents, args.entries)?);
    Ok(())
}

/// Render the archive contents as pretty JSON.
fn render(contents: &ArchiveContents, entries: bool) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(contents)?;
    if !entries {
        if let Some(object) = value.as_object_mut() {
            object.remove("entries");
            object.remove("layer_entries");
        }
    }
    serde_json::to_string_pretty(&value)
}

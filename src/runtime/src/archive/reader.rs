//! Reading back a produced docker archive.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use docker_fixture_core::constants::{
    LAYER_ID, LAYER_TAR_FILE, MANIFEST_FILE, REPOSITORIES_FILE, VERSION_FILE,
};
use docker_fixture_core::error::{FixtureError, Result};
use serde::Serialize;

use super::manifest::{LayerManifest, Repositories};

/// Parsed contents of a docker archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveContents {
    /// `repositories` index
    pub repositories: Repositories,
    /// `<layer id>/json`
    pub manifest: LayerManifest,
    /// `<layer id>/VERSION`
    pub version: String,
    /// Entry paths of the image archive, normalized (no `./` prefix)
    pub entries: Vec<String>,
    /// Entry paths inside `<layer id>/layer.tar`, normalized
    pub layer_entries: Vec<String>,
}

impl ArchiveContents {
    /// Read and parse the archive at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            FixtureError::ArchiveError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let manifest_path = format!("{}/{}", LAYER_ID, MANIFEST_FILE);
        let version_path = format!("{}/{}", LAYER_ID, VERSION_FILE);
        let layer_tar_path = format!("{}/{}", LAYER_ID, LAYER_TAR_FILE);

        let mut repositories = None;
        let mut manifest = None;
        let mut version = None;
        let mut layer_entries = None;
        let mut entries = Vec::new();

        let mut archive = tar::Archive::new(file);
        for entry in archive.entries().map_err(read_error)? {
            let mut entry = entry.map_err(read_error)?;
            let name = match normalize(&entry.path().map_err(read_error)?.to_string_lossy()) {
                Some(name) => name,
                None => continue,
            };

            if name == REPOSITORIES_FILE {
                repositories = Some(serde_json::from_slice(&read_entry(&mut entry)?)?);
            } else if name == manifest_path {
                manifest = Some(serde_json::from_slice(&read_entry(&mut entry)?)?);
            } else if name == version_path {
                let data = read_entry(&mut entry)?;
                version = Some(String::from_utf8_lossy(&data).into_owned());
            } else if name == layer_tar_path {
                layer_entries = Some(list_entries(Cursor::new(read_entry(&mut entry)?))?);
            }

            entries.push(name);
        }

        Ok(Self {
            repositories: repositories.ok_or_else(|| missing(path, REPOSITORIES_FILE))?,
            manifest: manifest.ok_or_else(|| missing(path, &manifest_path))?,
            version: version.ok_or_else(|| missing(path, &version_path))?,
            entries,
            layer_entries: layer_entries.ok_or_else(|| missing(path, &layer_tar_path))?,
        })
    }
}

/// List normalized entry paths of a tar stream.
fn list_entries<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries().map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if let Some(name) = normalize(&entry.path().map_err(read_error)?.to_string_lossy()) {
            names.push(name);
        }
    }
    Ok(names)
}

fn read_entry<R: Read>(entry: &mut R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    entry.read_to_end(&mut data).map_err(read_error)?;
    Ok(data)
}

/// Strip `./` and trailing `/`; the archive root itself yields `None`.
fn normalize(name: &str) -> Option<String> {
    let name = name.trim_start_matches("./").trim_end_matches('/');
    if name.is_empty() || name == "." {
        None
    } else {
        Some(name.to_string())
    }
}

fn read_error(e: std::io::Error) -> FixtureError {
    FixtureError::ArchiveError(format!("Failed to read archive: {}", e))
}

fn missing(path: &Path, entry: &str) -> FixtureError {
    FixtureError::ArchiveError(format!("{} has no '{}' entry", path.display(), entry))
}

//! Tar packing of directory trees.

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docker_fixture_core::error::{FixtureError, Result};

/// Packs a directory into a tar archive.
#[async_trait]
pub trait ArchivePacker: Send + Sync {
    /// Archive the contents of `source` into `output`, with every entry
    /// stored under `base` (usually `.`).
    ///
    /// A pack that is cancelled before completing returns
    /// [`FixtureError::Discarded`].
    async fn pack(&self, base: &Path, output: &Path, source: &Path) -> Result<()>;
}

/// Uncompressed tar packer with deterministic output.
///
/// Entries are written in sorted order with normalized headers (fixed
/// mtime, uid/gid 0), so packing the same tree twice yields the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarPacker;

impl TarPacker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchivePacker for TarPacker {
    async fn pack(&self, base: &Path, output: &Path, source: &Path) -> Result<()> {
        let base = base.to_path_buf();
        let output = output.to_path_buf();
        let source = source.to_path_buf();

        tracing::debug!(
            source = %source.display(),
            output = %output.display(),
            "Packing directory"
        );

        let handle = tokio::task::spawn_blocking(move || pack_dir(&base, &output, &source));

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FixtureError::Discarded),
            Err(e) => Err(FixtureError::PackError(format!("Packing task failed: {}", e))),
        }
    }
}

/// Write `source` into a new tar file at `output`.
fn pack_dir(base: &Path, output: &Path, source: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(FixtureError::PackError(format!(
            "Source is not a directory: {}",
            source.display()
        )));
    }

    let file = File::create(output).map_err(|e| {
        FixtureError::PackError(format!("Failed to create {}: {}", output.display(), e))
    })?;

    let mut builder = tar::Builder::new(file);
    builder.mode(tar::HeaderMode::Deterministic);
    builder.follow_symlinks(false);

    builder.append_dir(base, source).map_err(|e| {
        FixtureError::PackError(format!("Failed to add {} to archive: {}", base.display(), e))
    })?;
    add_dir_to_tar(&mut builder, source, source, base)?;

    builder
        .into_inner()
        .and_then(|file| file.sync_all())
        .map_err(|e| FixtureError::PackError(format!("Failed to finalize archive: {}", e)))?;

    Ok(())
}

/// Recursively add a directory's contents to a tar builder, in name order.
fn add_dir_to_tar<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    root: &Path,
    current: &Path,
    base: &Path,
) -> Result<()> {
    let mut entries = std::fs::read_dir(current)
        .and_then(|dir| dir.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| {
            FixtureError::PackError(format!(
                "Failed to read directory {}: {}",
                current.display(),
                e
            ))
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let tar_path = archive_path(root, &path, base)?;
        let file_type = entry.file_type().map_err(|e| {
            FixtureError::PackError(format!("Failed to stat {}: {}", path.display(), e))
        })?;

        if file_type.is_dir() {
            builder.append_dir(&tar_path, &path).map_err(|e| {
                FixtureError::PackError(format!(
                    "Failed to add directory {} to archive: {}",
                    tar_path.display(),
                    e
                ))
            })?;
            add_dir_to_tar(builder, root, &path, base)?;
        } else {
            builder.append_path_with_name(&path, &tar_path).map_err(|e| {
                FixtureError::PackError(format!(
                    "Failed to add file {} to archive: {}",
                    tar_path.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

fn archive_path(root: &Path, path: &Path, base: &Path) -> Result<PathBuf> {
    let relative = path.strip_prefix(root).map_err(|e| {
        FixtureError::PackError(format!(
            "Failed to compute relative path for {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(base.join(relative))
}

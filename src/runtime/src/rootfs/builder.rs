//! Rootfs builder for the synthetic image layer.
//!
//! Creates a minimal Linux rootfs containing:
//! - Basic directory structure
//! - Essential configuration files
//! - Optional files copied from the host (e.g. `/bin/sh`)

use std::fs;
use std::path::{Component, Path, PathBuf};

use docker_fixture_core::error::{FixtureError, Result};

use super::layout::RootfsLayout;

/// Populates an empty directory with a root filesystem tree.
pub trait RootfsProvider: Send + Sync {
    /// Fill `rootfs_path`, which already exists and is empty.
    fn populate(&self, rootfs_path: &Path) -> Result<()>;
}

/// Builder for the layer rootfs.
#[derive(Debug, Clone)]
pub struct RootfsBuilder {
    /// Absolute host paths copied into the rootfs at the same location.
    host_files: Vec<PathBuf>,

    /// Rootfs layout configuration.
    layout: RootfsLayout,
}

impl RootfsBuilder {
    /// Create a new rootfs builder with the standard layout.
    pub fn new() -> Self {
        Self {
            host_files: Vec::new(),
            layout: RootfsLayout::standard(),
        }
    }

    /// Copy a host file into the rootfs at the same path.
    pub fn with_host_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.host_files.push(path.into());
        self
    }

    /// Copy several host files into the rootfs.
    pub fn with_host_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.host_files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Set a custom layout.
    pub fn with_layout(mut self, layout: RootfsLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Build the rootfs under `rootfs_path`.
    pub fn build(&self, rootfs_path: &Path) -> Result<()> {
        tracing::info!(rootfs = %rootfs_path.display(), "Building layer rootfs");

        for host_file in &self.host_files {
            rootfs_relative(host_file)?;
        }

        fs::create_dir_all(rootfs_path).map_err(|e| {
            FixtureError::RootfsError(format!(
                "Failed to create rootfs directory {}: {}",
                rootfs_path.display(),
                e
            ))
        })?;

        self.create_directories(rootfs_path)?;
        self.create_essential_files(rootfs_path)?;

        for host_file in &self.host_files {
            self.copy_host_file(rootfs_path, host_file)?;
        }

        tracing::info!("Layer rootfs built successfully");
        Ok(())
    }

    /// Create the directory structure.
    fn create_directories(&self, rootfs_path: &Path) -> Result<()> {
        for dir in self.layout.required_dirs() {
            let full_path = rootfs_path.join(dir.trim_start_matches('/'));
            fs::create_dir_all(&full_path).map_err(|e| {
                FixtureError::RootfsError(format!(
                    "Failed to create directory {}: {}",
                    full_path.display(),
                    e
                ))
            })?;
            tracing::debug!(dir = %full_path.display(), "Created directory");
        }
        Ok(())
    }

    /// Create essential configuration files.
    fn create_essential_files(&self, rootfs_path: &Path) -> Result<()> {
        let etc = self.layout.etc_dir.trim_start_matches('/');

        // Minimal user database
        let passwd_content =
            "root:x:0:0:root:/root:/bin/sh\nnobody:x:65534:65534:nobody:/:/bin/false\n";
        write_file(rootfs_path, &format!("{}/passwd", etc), passwd_content)?;

        let group_content = "root:x:0:\nnogroup:x:65534:\n";
        write_file(rootfs_path, &format!("{}/group", etc), group_content)?;

        let hosts_content = "127.0.0.1\tlocalhost\n::1\t\tlocalhost\n";
        write_file(rootfs_path, &format!("{}/hosts", etc), hosts_content)?;

        let resolv_content = "nameserver 8.8.8.8\nnameserver 8.8.4.4\n";
        write_file(rootfs_path, &format!("{}/resolv.conf", etc), resolv_content)?;

        let nsswitch_content = "passwd: files\ngroup: files\nhosts: files dns\n";
        write_file(rootfs_path, &format!("{}/nsswitch.conf", etc), nsswitch_content)?;

        Ok(())
    }

    /// Copy a host file into the rootfs, keeping its permissions.
    fn copy_host_file(&self, rootfs_path: &Path, source: &Path) -> Result<()> {
        let relative = rootfs_relative(source)?;
        if !source.is_file() {
            return Err(FixtureError::RootfsError(format!(
                "Host file not found: {}",
                source.display()
            )));
        }

        let dest = rootfs_path.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FixtureError::RootfsError(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tracing::debug!(
            src = %source.display(),
            dest = %dest.display(),
            "Copying host file"
        );

        // fs::copy carries the permission bits over
        fs::copy(source, &dest).map_err(|e| {
            FixtureError::RootfsError(format!(
                "Failed to copy {} into rootfs: {}",
                source.display(),
                e
            ))
        })?;

        Ok(())
    }
}

impl Default for RootfsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RootfsProvider for RootfsBuilder {
    fn populate(&self, rootfs_path: &Path) -> Result<()> {
        self.build(rootfs_path)
    }
}

/// Location of a host file inside the rootfs. Only absolute paths without
/// `..` are accepted, so the copy can never land outside the rootfs.
fn rootfs_relative(source: &Path) -> Result<&Path> {
    let escapes = source
        .components()
        .any(|component| component == Component::ParentDir);
    if !source.is_absolute() || escapes {
        return Err(FixtureError::RootfsError(format!(
            "Host file must be an absolute path without '..': {}",
            source.display()
        )));
    }
    source.strip_prefix("/").map_err(|e| {
        FixtureError::RootfsError(format!("Invalid host file {}: {}", source.display(), e))
    })
}

/// Write a file into the rootfs, creating its parent directory.
fn write_file(rootfs_path: &Path, relative_path: &str, content: &str) -> Result<()> {
    let full_path = rootfs_path.join(relative_path);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            FixtureError::RootfsError(format!("Failed to create parent directory: {}", e))
        })?;
    }

    fs::write(&full_path, content).map_err(|e| {
        FixtureError::RootfsError(format!("Failed to write {}: {}", full_path.display(), e))
    })?;

    tracing::debug!(path = %full_path.display(), "Created file");
    Ok(())
}

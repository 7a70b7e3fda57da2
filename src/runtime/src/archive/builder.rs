//! Docker archive construction.
//!
//! Runs the fixed sequence that turns an [`ImageDescriptor`] into
//! `<directory>/<name>.tar`:
//!
//! 1. Layout: ensure `directory`, create `directory/name`, write `repositories`
//! 2. Layer: create `<layer id>/`, write `json`, build and pack `layer/` into
//!    `layer.tar`, remove `layer/`, write `VERSION`
//! 3. Image: pack `directory/name` into `directory/name.tar`, remove it
//!
//! The first failing step aborts the sequence. Nothing written before the
//! failure is cleaned up.

use std::fs;
use std::path::{Path, PathBuf};

use docker_fixture_core::constants::{
    LAYER_ID, LAYER_TAR_FILE, LAYER_VERSION, MANIFEST_FILE, REPOSITORIES_FILE, ROOTFS_DIR,
    VERSION_FILE,
};
use docker_fixture_core::error::{FixtureError, Result};
use docker_fixture_core::{FixtureConfig, ImageDescriptor};

use super::manifest::{repositories, LayerManifest};
use super::packer::{ArchivePacker, TarPacker};
use crate::rootfs::{RootfsBuilder, RootfsProvider};

/// Builder for a `docker save`-style image archive.
pub struct DockerArchive {
    /// Directory the archive is written into
    directory: PathBuf,
    /// Image to synthesize
    image: ImageDescriptor,
    /// Fills the layer rootfs
    rootfs: Box<dyn RootfsProvider>,
    /// Packs the layer and the image
    packer: Box<dyn ArchivePacker>,
}

impl DockerArchive {
    /// Create a builder using the standard rootfs and tar packer.
    pub fn new(directory: impl Into<PathBuf>, image: ImageDescriptor) -> Self {
        Self {
            directory: directory.into(),
            image,
            rootfs: Box::new(RootfsBuilder::new()),
            packer: Box::new(TarPacker::new()),
        }
    }

    /// Create a builder from a configuration, copying its host files into
    /// the rootfs.
    pub fn from_config(config: &FixtureConfig) -> Self {
        let rootfs = RootfsBuilder::new().with_host_files(config.host_files.iter().cloned());
        Self::new(config.directory.clone(), config.image.clone()).with_rootfs(rootfs)
    }

    /// Replace the rootfs provider.
    pub fn with_rootfs(mut self, rootfs: impl RootfsProvider + 'static) -> Self {
        self.rootfs = Box::new(rootfs);
        self
    }

    /// Replace the archive packer.
    pub fn with_packer(mut self, packer: impl ArchivePacker + 'static) -> Self {
        self.packer = Box::new(packer);
        self
    }

    /// Transient image directory (`directory/name`).
    pub fn image_path(&self) -> PathBuf {
        self.directory.join(&self.image.name)
    }

    /// Final archive (`directory/name.tar`).
    pub fn archive_path(&self) -> PathBuf {
        self.directory.join(self.image.archive_file_name())
    }

    /// Run the whole sequence and return the archive path.
    pub async fn create(&self) -> Result<PathBuf> {
        tracing::info!(
            directory = %self.directory.display(),
            image = %self.image.name,
            "Creating docker archive"
        );

        let image_path = self.build_layout()?;
        self.write_layer(&image_path).await?;
        let archive = self.pack_image(&image_path).await?;

        tracing::info!(archive = %archive.display(), "Docker archive created");
        Ok(archive)
    }

    /// Create the image directory and its `repositories` index.
    fn build_layout(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            archive_error(format!(
                "Failed to create '{}': {}",
                self.directory.display(),
                e
            ))
        })?;
        tracing::debug!(directory = %self.directory.display(), "Target directory ensured");

        let image_path = self.image_path();
        fs::create_dir(&image_path).map_err(|e| {
            archive_error(format!(
                "Failed to create docker test image directory '{}': {}",
                image_path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %image_path.display(), "Image directory created");

        let index = serde_json::to_string(&repositories(&self.image.name))?;
        fs::write(image_path.join(REPOSITORIES_FILE), index).map_err(|e| {
            archive_error(format!(
                "Failed to save docker test image '{}': {}",
                REPOSITORIES_FILE, e
            ))
        })?;
        tracing::debug!("Repository index written");

        Ok(image_path)
    }

    /// Create the layer directory with its manifest, `layer.tar` and
    /// `VERSION`.
    async fn write_layer(&self, image_path: &Path) -> Result<()> {
        let layer_path = image_path.join(LAYER_ID);

        fs::create_dir(&layer_path).map_err(|e| {
            archive_error(format!(
                "Failed to create docker test image layer '{}': {}",
                LAYER_ID, e
            ))
        })?;
        tracing::debug!(path = %layer_path.display(), "Layer directory created");

        let manifest = LayerManifest::render(&self.image)
            .and_then(|manifest| manifest.to_json())
            .map_err(|e| {
                archive_error(format!(
                    "Failed to render docker test image layer '{}': {}",
                    LAYER_ID, e
                ))
            })?;
        fs::write(layer_path.join(MANIFEST_FILE), manifest).map_err(|e| {
            archive_error(format!(
                "Failed to save docker test image layer '{}': {}",
                LAYER_ID, e
            ))
        })?;
        tracing::debug!("Layer manifest written");

        let rootfs_dir = layer_path.join(ROOTFS_DIR);
        fs::create_dir(&rootfs_dir).map_err(|e| {
            archive_error(format!(
                "Failed to create layer rootfs directory '{}': {}",
                rootfs_dir.display(),
                e
            ))
        })?;
        tracing::debug!(rootfs = %rootfs_dir.display(), "Layer rootfs directory created");

        self.rootfs.populate(&rootfs_dir).map_err(|e| {
            archive_error(format!("Failed to create docker test image rootfs: {}", e))
        })?;
        tracing::debug!(rootfs = %rootfs_dir.display(), "Layer rootfs populated");

        self.packer
            .pack(Path::new("."), &layer_path.join(LAYER_TAR_FILE), &rootfs_dir)
            .await
            .map_err(|e| archive_error(format!("Failed to tar root filesystem: {}", e)))?;
        tracing::debug!("Layer packed");

        fs::remove_dir_all(&rootfs_dir).map_err(|e| {
            archive_error(format!("Failed to remove layer rootfs directory: {}", e))
        })?;
        tracing::debug!(rootfs = %rootfs_dir.display(), "Layer rootfs directory removed");

        fs::write(layer_path.join(VERSION_FILE), LAYER_VERSION)
            .map_err(|e| archive_error(format!("Failed to save layer version: {}", e)))?;
        tracing::debug!("Layer version written");

        Ok(())
    }

    /// Pack the image directory next to itself and remove it.
    async fn pack_image(&self, image_path: &Path) -> Result<PathBuf> {
        let archive = self.archive_path();

        self.packer
            .pack(Path::new("."), &archive, image_path)
            .await
            .map_err(|e| archive_error(format!("Failed to tar docker test image: {}", e)))?;
        tracing::debug!(archive = %archive.display(), "Image packed");

        fs::remove_dir_all(image_path)
            .map_err(|e| archive_error(format!("Failed to remove image directory: {}", e)))?;
        tracing::debug!(path = %image_path.display(), "Image directory removed");

        Ok(archive)
    }
}

/// Create `<directory>/<image.name>.tar` with the standard rootfs and packer.
pub async fn create_docker_archive(directory: &Path, image: ImageDescriptor) -> Result<PathBuf> {
    DockerArchive::new(directory, image).create().await
}

fn archive_error(message: String) -> FixtureError {
    FixtureError::ArchiveError(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveContents;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FailingRootfs;

    impl RootfsProvider for FailingRootfs {
        fn populate(&self, _rootfs_path: &Path) -> Result<()> {
            Err(FixtureError::RootfsError("no base image available".to_string()))
        }
    }

    /// Delegates to [`TarPacker`] until call number `discard_at`, which is
    /// reported as cancelled.
    struct DiscardingPacker {
        calls: AtomicUsize,
        discard_at: usize,
    }

    impl DiscardingPacker {
        fn new(discard_at: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                discard_at,
            }
        }
    }

    #[async_trait]
    impl ArchivePacker for DiscardingPacker {
        async fn pack(&self, base: &Path, output: &Path, source: &Path) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == self.discard_at {
                return Err(FixtureError::Discarded);
            }
            TarPacker::new().pack(base, output, source).await
        }
    }

    struct FailingPacker;

    #[async_trait]
    impl ArchivePacker for FailingPacker {
        async fn pack(&self, _base: &Path, _output: &Path, _source: &Path) -> Result<()> {
            Err(FixtureError::PackError("disk full".to_string()))
        }
    }

    /// Packs normally, then deletes the source of the image pack so the
    /// removal that follows has nothing to remove.
    struct SourceStealingPacker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArchivePacker for SourceStealingPacker {
        async fn pack(&self, base: &Path, output: &Path, source: &Path) -> Result<()> {
            TarPacker::new().pack(base, output, source).await?;
            if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
                fs::remove_dir_all(source)
                    .map_err(|e| FixtureError::PackError(e.to_string()))?;
            }
            Ok(())
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_create_leaves_only_archive() {
        let tmp = TempDir::new().unwrap();
        let directory = tmp.path().join("registry");

        let archive = create_docker_archive(&directory, ImageDescriptor::new("alpine"))
            .await
            .unwrap();

        assert_eq!(archive, directory.join("alpine.tar"));
        assert_eq!(dir_entries(&directory), vec!["alpine.tar"]);
    }

    #[tokio::test]
    async fn test_create_writes_repositories() {
        let tmp = TempDir::new().unwrap();
        let archive = create_docker_archive(tmp.path(), ImageDescriptor::new("alpine"))
            .await
            .unwrap();

        let contents = ArchiveContents::read(&archive).unwrap();
        assert_eq!(
            serde_json::to_value(&contents.repositories).unwrap(),
            json!({ "alpine": { "latest": LAYER_ID } })
        );
    }

    #[tokio::test]
    async fn test_create_embeds_image_config() {
        let tmp = TempDir::new().unwrap();
        let image = ImageDescriptor::new("busybox")
            .with_entrypoint(r#"["sh", "-c"]"#)
            .with_cmd(r#"["sleep 1000"]"#)
            .with_environment(["PATH=/usr/bin:/bin", "HOME=/root"]);

        let archive = create_docker_archive(tmp.path(), image).await.unwrap();
        let contents = ArchiveContents::read(&archive).unwrap();

        let config = &contents.manifest.config;
        assert_eq!(
            config.env,
            Some(vec!["PATH=/usr/bin:/bin".to_string(), "HOME=/root".to_string()])
        );
        assert_eq!(config.cmd, json!(["sleep 1000"]));
        assert_eq!(config.entrypoint, json!(["sh", "-c"]));
        assert_eq!(contents.manifest.id, LAYER_ID);
    }

    #[tokio::test]
    async fn test_create_writes_version_and_layer_tar() {
        let tmp = TempDir::new().unwrap();
        let archive = create_docker_archive(tmp.path(), ImageDescriptor::new("alpine"))
            .await
            .unwrap();

        let contents = ArchiveContents::read(&archive).unwrap();
        assert_eq!(contents.version, "1.0");
        assert!(contents.layer_entries.contains(&"etc/passwd".to_string()));
        assert!(contents.layer_entries.contains(&"proc".to_string()));
        assert!(!contents.entries.iter().any(|e| e.ends_with("/layer")));
    }

    #[tokio::test]
    async fn test_create_fails_when_directory_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let directory = blocker.join("registry");

        let err = create_docker_archive(&directory, ImageDescriptor::new("alpine"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to create '"));
        assert_eq!(dir_entries(tmp.path()), vec!["blocker"]);
    }

    #[tokio::test]
    async fn test_create_fails_when_image_directory_exists() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("alpine")).unwrap();

        let err = create_docker_archive(tmp.path(), ImageDescriptor::new("alpine"))
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("Failed to create docker test image directory"));
        assert!(!tmp.path().join("alpine.tar").exists());
    }

    #[tokio::test]
    async fn test_rootfs_failure_leaves_partial_state() {
        let tmp = TempDir::new().unwrap();
        let builder =
            DockerArchive::new(tmp.path(), ImageDescriptor::new("alpine")).with_rootfs(FailingRootfs);

        let err = builder.create().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to create docker test image rootfs: Rootfs error: no base image"));

        let layer_path = builder.image_path().join(LAYER_ID);
        assert!(layer_path.join(MANIFEST_FILE).exists());
        assert!(!layer_path.join(LAYER_TAR_FILE).exists());
        assert!(!builder.archive_path().exists());
    }

    #[tokio::test]
    async fn test_discarded_layer_pack_keeps_rootfs() {
        let tmp = TempDir::new().unwrap();
        let builder = DockerArchive::new(tmp.path(), ImageDescriptor::new("alpine"))
            .with_packer(DiscardingPacker::new(0));

        let err = builder.create().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to tar root filesystem: discarded"));

        let layer_path = builder.image_path().join(LAYER_ID);
        assert!(layer_path.join(ROOTFS_DIR).join("etc/passwd").exists());
        assert!(!layer_path.join(VERSION_FILE).exists());
    }

    #[tokio::test]
    async fn test_failed_layer_pack_keeps_rootfs() {
        let tmp = TempDir::new().unwrap();
        let builder = DockerArchive::new(tmp.path(), ImageDescriptor::new("alpine"))
            .with_packer(FailingPacker);

        let err = builder.create().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to tar root filesystem: Pack error: disk full"));
        assert!(!err.to_string().contains("discarded"));

        let layer_path = builder.image_path().join(LAYER_ID);
        assert!(layer_path.join(ROOTFS_DIR).join("etc/passwd").exists());
        assert!(!layer_path.join(VERSION_FILE).exists());
        assert!(!builder.archive_path().exists());
    }

    #[tokio::test]
    async fn test_image_removal_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let builder = DockerArchive::new(tmp.path(), ImageDescriptor::new("alpine"))
            .with_packer(SourceStealingPacker {
                calls: AtomicUsize::new(0),
            });

        let err = builder.create().await.unwrap_err();
        assert!(err.to_string().contains("Failed to remove image directory"));
        assert!(builder.archive_path().is_file());
    }

    #[tokio::test]
    async fn test_discarded_image_pack_skips_removal() {
        let tmp = TempDir::new().unwrap();
        let builder = DockerArchive::new(tmp.path(), ImageDescriptor::new("alpine"))
            .with_packer(DiscardingPacker::new(1));

        let err = builder.create().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to tar docker test image: discarded"));

        let layer_path = builder.image_path().join(LAYER_ID);
        assert!(layer_path.join(LAYER_TAR_FILE).exists());
        assert!(layer_path.join(VERSION_FILE).exists());
        assert!(!layer_path.join(ROOTFS_DIR).exists());
    }

    #[tokio::test]
    async fn test_malformed_cmd_fails_at_manifest() {
        let tmp = TempDir::new().unwrap();
        let image = ImageDescriptor::new("alpine").with_cmd("[\"sh\",");
        let builder = DockerArchive::new(tmp.path(), image);

        let err = builder.create().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to render docker test image layer"));

        let layer_path = builder.image_path().join(LAYER_ID);
        assert!(layer_path.is_dir());
        assert!(!layer_path.join(MANIFEST_FILE).exists());
    }

    #[tokio::test]
    async fn test_create_is_reproducible() {
        let mut archives = Vec::new();
        let mut temps = Vec::new();

        for _ in 0..2 {
            let tmp = TempDir::new().unwrap();
            let archive = create_docker_archive(tmp.path(), ImageDescriptor::new("alpine"))
                .await
                .unwrap();
            archives.push(fs::read(&archive).unwrap());
            temps.push(tmp);
        }

        assert_eq!(archives[0], archives[1]);
    }

    #[tokio::test]
    async fn test_from_config_copies_host_files() {
        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("host").join("tool");
        fs::create_dir_all(tool.parent().unwrap()).unwrap();
        fs::write(&tool, "#!/bin/sh\n").unwrap();

        let mut config = FixtureConfig::new(tmp.path().join("out"), ImageDescriptor::new("tools"));
        config.host_files.push(tool.clone());

        let archive = DockerArchive::from_config(&config).create().await.unwrap();
        let contents = ArchiveContents::read(&archive).unwrap();

        let expected = tool.strip_prefix("/").unwrap().to_string_lossy().to_string();
        assert!(contents.layer_entries.contains(&expected));
    }
}

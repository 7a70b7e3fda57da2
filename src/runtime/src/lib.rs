//! Docker Fixture Runtime - docker archive construction.
//!
//! This module builds `docker save`-style image archives for use as test
//! fixtures: the image layout and metadata, the layer rootfs, and the
//! tar packing of both.

pub mod archive;
pub mod rootfs;

// Re-export common types
pub use archive::{
    create_docker_archive, ArchiveContents, ArchivePacker, DockerArchive, LayerManifest, TarPacker,
};
pub use rootfs::{RootfsBuilder, RootfsLayout, RootfsProvider};

/// Docker Fixture Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

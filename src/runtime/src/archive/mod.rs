//! Docker archive support.
//!
//! Produces the legacy `docker save` layout as a single tar file:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    <name>.tar                               │
//! │                                                             │
//! │  ├── repositories         ({"<name>": {"latest": <id>}})    │
//! │  └── <layer id>/                                            │
//! │      ├── json             (Layer manifest)                  │
//! │      ├── layer.tar        (Packed rootfs)                   │
//! │      └── VERSION          ("1.0")                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod builder;
mod manifest;
mod packer;
mod reader;

pub use builder::{create_docker_archive, DockerArchive};
pub use manifest::{repositories, ContainerConfig, LayerManifest, Repositories};
pub use packer::{ArchivePacker, TarPacker};
pub use reader::ArchiveContents;

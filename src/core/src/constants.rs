//! Fixed identity of the synthetic image.
//!
//! Every archive produced by this workspace describes the same single layer,
//! built by the same fictitious container on the same date. Tests assert
//! against these values by name.

/// Identifier of the only layer. Used as the layer directory name, the
/// manifest `id`, and the `latest` tag target in `repositories`.
pub const LAYER_ID: &str = "815b809d588c80fd6ddf4d6ac244ad1c01ae4cbe0f91cc7480e306671ee9c346";

/// Identifier of the container that supposedly produced the layer.
pub const CONTAINER_ID: &str = "eb53609036555d26c39bdccfa9850426934bdfde96111d099041689b2251a377";

/// Hostname of the build container (short form of [`CONTAINER_ID`]).
pub const CONTAINER_HOSTNAME: &str = "eb5360903655";

/// Layer creation timestamp.
pub const CREATED: &str = "2016-03-02T17:16:00.167415955Z";

/// Docker version recorded in the manifest.
pub const DOCKER_VERSION: &str = "1.9.1";

/// Image architecture.
pub const ARCHITECTURE: &str = "amd64";

/// Image operating system.
pub const OS: &str = "linux";

/// Build command recorded in `container_config.Cmd`.
pub const BUILD_CMD: [&str; 3] = [
    "/bin/sh",
    "-c",
    "#(nop) ADD file:81ba6f20bdb99e6c13c434a577069860b6656908031162083b1ac9c02c71dd9f in /",
];

/// Content of each layer's `VERSION` file.
pub const LAYER_VERSION: &str = "1.0";

/// Tag that `repositories` maps to the layer.
pub const LATEST_TAG: &str = "latest";

/// File names inside the image directory.
pub const REPOSITORIES_FILE: &str = "repositories";
pub const MANIFEST_FILE: &str = "json";
pub const LAYER_TAR_FILE: &str = "layer.tar";
pub const VERSION_FILE: &str = "VERSION";

/// Transient rootfs directory inside the layer directory.
pub const ROOTFS_DIR: &str = "layer";

/// Default `Entrypoint`/`Cmd` fragment.
pub const DEFAULT_JSON_FRAGMENT: &str = "null";

/// Default image environment.
///
/// These values break the built-in executors if they ever leak into them,
/// so an image environment reaching the wrong process fails loudly.
pub const DEFAULT_ENVIRONMENT: [&str; 3] = [
    "LD_LIBRARY_PATH=invalid",
    "LIBPROCESS_IP=invalid",
    "LIBPROCESS_PORT=invalid",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_id_is_64_hex_chars() {
        assert_eq!(LAYER_ID.len(), 64);
        assert!(LAYER_ID.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hostname_is_container_id_prefix() {
        assert!(CONTAINER_ID.starts_with(CONTAINER_HOSTNAME));
        assert_eq!(CONTAINER_HOSTNAME.len(), 12);
    }

    #[test]
    fn test_layer_version() {
        assert_eq!(LAYER_VERSION, "1.0");
    }
}

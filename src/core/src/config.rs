use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FixtureError, Result};
use crate::image::ImageDescriptor;

/// Fixture configuration, loadable from a YAML or JSON file.
///
/// ```yaml
/// directory: /tmp/registry
/// image:
///   name: alpine
///   cmd: '["sh"]'
/// host_files:
///   - /bin/sh
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Directory the archive is written into
    pub directory: PathBuf,

    /// Image to synthesize
    pub image: ImageDescriptor,

    /// Host files copied into the layer rootfs at the same path
    #[serde(default)]
    pub host_files: Vec<PathBuf>,
}

impl FixtureConfig {
    /// Create a configuration with no extra host files.
    pub fn new(directory: impl Into<PathBuf>, image: ImageDescriptor) -> Self {
        Self {
            directory: directory.into(),
            image,
            host_files: Vec::new(),
        }
    }

    /// Load a configuration file. `.yaml`/`.yml` are parsed as YAML,
    /// anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            FixtureError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&data)?
        } else {
            serde_json::from_str(&data)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never produce an archive.
    pub fn validate(&self) -> Result<()> {
        let name = &self.image.name;
        if name.is_empty() {
            return Err(FixtureError::ConfigError("Image name is empty".to_string()));
        }
        if name.contains('/') || name == "." || name == ".." {
            return Err(FixtureError::ConfigError(format!(
                "Image name '{}' is not a single path component",
                name
            )));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(FixtureError::ConfigError(
                "Target directory is empty".to_string(),
            ));
        }
        Ok(())
    }
}

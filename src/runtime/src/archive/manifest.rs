//! Metadata documents of the docker archive: the `repositories` index and
//! the layer `json` manifest.

use std::collections::BTreeMap;

use docker_fixture_core::constants::{
    ARCHITECTURE, BUILD_CMD, CONTAINER_HOSTNAME, CONTAINER_ID, CREATED, DOCKER_VERSION, LATEST_TAG,
    LAYER_ID, OS,
};
use docker_fixture_core::error::{FixtureError, Result};
use docker_fixture_core::ImageDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `repositories` file: repository name → tag → layer id.
pub type Repositories = BTreeMap<String, BTreeMap<String, String>>;

/// Build the `repositories` index mapping `name:latest` to the fixed layer.
pub fn repositories(name: &str) -> Repositories {
    let mut tags = BTreeMap::new();
    tags.insert(LATEST_TAG.to_string(), LAYER_ID.to_string());

    let mut repositories = BTreeMap::new();
    repositories.insert(name.to_string(), tags);
    repositories
}

/// Layer manifest, stored as `<layer id>/json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerManifest {
    pub id: String,
    pub created: String,
    pub container: String,
    pub container_config: ContainerConfig,
    pub docker_version: String,
    pub config: ContainerConfig,
    pub architecture: String,
    pub os: String,
}

/// Docker container configuration as found in legacy layer manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    pub hostname: String,
    pub domainname: String,
    pub user: String,
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub tty: bool,
    pub open_stdin: bool,
    pub stdin_once: bool,
    pub env: Option<Vec<String>>,
    pub cmd: Value,
    pub image: String,
    pub volumes: Value,
    pub working_dir: String,
    pub entrypoint: Value,
    pub on_build: Value,
    pub labels: Value,
}

impl ContainerConfig {
    /// Configuration of the fictitious build container, everything unset.
    fn build_container() -> Self {
        Self {
            hostname: CONTAINER_HOSTNAME.to_string(),
            domainname: String::new(),
            user: String::new(),
            attach_stdin: false,
            attach_stdout: false,
            attach_stderr: false,
            tty: false,
            open_stdin: false,
            stdin_once: false,
            env: None,
            cmd: Value::Null,
            image: String::new(),
            volumes: Value::Null,
            working_dir: String::new(),
            entrypoint: Value::Null,
            on_build: Value::Null,
            labels: Value::Null,
        }
    }
}

impl LayerManifest {
    /// Render the manifest for `image`.
    ///
    /// `image.cmd` and `image.entrypoint` must each be a complete JSON value.
    pub fn render(image: &ImageDescriptor) -> Result<Self> {
        let cmd = parse_fragment("Cmd", &image.cmd)?;
        let entrypoint = parse_fragment("Entrypoint", &image.entrypoint)?;

        let container_config = ContainerConfig {
            cmd: Value::from(BUILD_CMD.to_vec()),
            ..ContainerConfig::build_container()
        };

        let config = ContainerConfig {
            env: Some(image.environment.clone()),
            cmd,
            entrypoint,
            ..ContainerConfig::build_container()
        };

        Ok(Self {
            id: LAYER_ID.to_string(),
            created: CREATED.to_string(),
            container: CONTAINER_ID.to_string(),
            container_config,
            docker_version: DOCKER_VERSION.to_string(),
            config,
            architecture: ARCHITECTURE.to_string(),
            os: OS.to_string(),
        })
    }

    /// Serialize to the compact form written to disk.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn parse_fragment(field: &str, fragment: &str) -> Result<Value> {
    serde_json::from_str(fragment).map_err(|e| {
        FixtureError::SerializationError(format!(
            "{} is not valid JSON ({:?}): {}",
            field, fragment, e
        ))
    })
}

//! Caller-supplied description of the image to synthesize.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ENVIRONMENT, DEFAULT_JSON_FRAGMENT};

/// Image descriptor.
///
/// `entrypoint` and `cmd` are raw JSON fragments (e.g. `["sh", "-c"]` or
/// `null`), copied into the layer manifest as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Repository name, also the archive file stem
    pub name: String,

    /// `config.Entrypoint` as a JSON fragment
    #[serde(default = "default_fragment")]
    pub entrypoint: String,

    /// `config.Cmd` as a JSON fragment
    #[serde(default = "default_fragment")]
    pub cmd: String,

    /// `config.Env` entries (`KEY=VALUE`)
    #[serde(default = "default_environment")]
    pub environment: Vec<String>,
}

fn default_fragment() -> String {
    DEFAULT_JSON_FRAGMENT.to_string()
}

fn default_environment() -> Vec<String> {
    DEFAULT_ENVIRONMENT.iter().map(|s| s.to_string()).collect()
}

impl ImageDescriptor {
    /// Create a descriptor with default entrypoint, cmd and environment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entrypoint: default_fragment(),
            cmd: default_fragment(),
            environment: default_environment(),
        }
    }

    /// Set the entrypoint fragment.
    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = entrypoint.into();
        self
    }

    /// Set the cmd fragment.
    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = cmd.into();
        self
    }

    /// Replace the whole environment.
    pub fn with_environment<I, S>(mut self, environment: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environment = environment.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single `KEY=VALUE` entry.
    pub fn with_env_var(mut self, key: &str, value: &str) -> Self {
        self.environment.push(format!("{}={}", key, value));
        self
    }

    /// File name of the final archive (`<name>.tar`).
    pub fn archive_file_name(&self) -> String {
        format!("{}.tar", self.name)
    }
}

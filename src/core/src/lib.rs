//! Docker Fixture Core - Foundational Types
//!
//! Error type, fixed image identity, image descriptor and configuration
//! shared by the docker fixture runtime and CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod image;

// Re-export commonly used types
pub use config::FixtureConfig;
pub use error::{FixtureError, Result};
pub use image::ImageDescriptor;

/// Docker fixture version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

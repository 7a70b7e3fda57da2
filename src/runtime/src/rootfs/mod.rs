//! Layer rootfs construction.
//!
//! Builds the synthetic root filesystem that gets packed into a layer's
//! `layer.tar`.

mod builder;
mod layout;

pub use builder::{RootfsBuilder, RootfsProvider};
pub use layout::RootfsLayout;

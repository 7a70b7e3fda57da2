//! Docker Fixture CLI - builds `docker save`-style test archives.

pub mod commands;
pub mod output;

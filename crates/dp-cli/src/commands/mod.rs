//! CLI subcommand implementations.

pub mod events;
pub mod plan;
pub mod tasks;
pub mod util;

//! Day planner CLI library.
//!
//! This crate provides the CLI interface for the day planner.

mod cli;
pub mod commands;
mod config;
pub mod oracle;

pub use cli::{Cli, Commands, Overrides};
pub use config::Config;

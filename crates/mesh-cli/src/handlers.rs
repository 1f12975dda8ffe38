//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod catalog;
mod check;
mod completions;
mod config;
mod utils;

pub use catalog::handle_catalog;
pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;

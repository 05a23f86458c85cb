//! CLI layer for tripforge.
//!
//! Provides the command-line interface using clap, with commands for
//! initializing the catalog, invoking tools and planning trips.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};

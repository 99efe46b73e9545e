//! CLI module for automv.
//!
//! This module provides the command-line interface: argument parsing and
//! formatting of analyses and moves.

mod commands;
mod output;

pub use commands::{Cli, ReportFormat};
pub use output::OutputFormatter;

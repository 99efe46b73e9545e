//! CLI argument definitions.
//!
//! This module defines the command-line flags using clap and merges them
//! over the loaded configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AutomvConfig, MoveFormat};

/// automv - Generate moves for resources that were renamed or relocated.
#[derive(Parser, Debug)]
#[command(name = "automv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, env = "AUTOMV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print moves without writing them anywhere.
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore differences matching TYPE.PATH (repeatable).
    #[arg(short, long = "ignore", value_name = "RULE")]
    pub ignore: Vec<String>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// How to emit moves.
    #[arg(short, long, value_enum)]
    pub output: Option<MoveFormat>,

    /// Print the analysis of every candidate pair.
    #[arg(short, long)]
    pub show_analysis: bool,

    /// Format of the analysis report.
    #[arg(long, value_enum, default_value = "text")]
    pub report: ReportFormat,

    /// Terraform binary to run.
    #[arg(long)]
    pub terraform_bin: Option<String>,

    /// Read a JSON plan instead of running terraform.
    #[arg(long)]
    pub plan_file: Option<PathBuf>,

    /// File that moved blocks are appended to.
    #[arg(long)]
    pub moves_file: Option<String>,

    /// Score candidate pairs on a single thread.
    #[arg(long)]
    pub no_parallel: bool,
}

/// Analysis report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Overrides configuration values with the flags that were given.
    /// `--ignore` rules are appended to the configured ones.
    pub fn apply_to(&self, config: &mut AutomvConfig) {
        if let Some(bin) = &self.terraform_bin {
            config.terraform_bin.clone_from(bin);
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(moves_file) = &self.moves_file {
            config.moves_file.clone_from(moves_file);
        }
        if self.no_parallel {
            config.parallel = false;
        }
        if self.show_analysis {
            config.show_analysis = true;
        }
        config.ignore.extend(self.ignore.iter().cloned());
    }
}

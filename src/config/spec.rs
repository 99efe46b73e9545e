//! Configuration types.
//!
//! This module defines the structs that map to `.automv.yaml`. Every field
//! has a default so an empty file (or no file at all) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AutomvConfig {
    /// Planner binary name or path.
    pub terraform_bin: String,
    /// Directory holding the configuration to analyze.
    pub working_dir: PathBuf,
    /// How moves are emitted.
    pub output: MoveFormat,
    /// File that `moved` blocks are appended to, relative to `working_dir`.
    pub moves_file: String,
    /// Ignore rules, in `TYPE.PATH` syntax.
    pub ignore: Vec<String>,
    /// Score candidate pairs on multiple threads.
    pub parallel: bool,
    /// Print the analysis before the moves.
    pub show_analysis: bool,
}

/// Output formats for discovered moves.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MoveFormat {
    /// `moved` blocks appended to the moves file.
    #[default]
    Blocks,
    /// `state mv` commands printed to stdout.
    Commands,
}

impl Default for AutomvConfig {
    fn default() -> Self {
        Self {
            terraform_bin: default_terraform_bin(),
            working_dir: PathBuf::from("."),
            output: MoveFormat::default(),
            moves_file: default_moves_file(),
            ignore: Vec::new(),
            parallel: true,
            show_analysis: false,
        }
    }
}

impl AutomvConfig {
    /// Path of the moves file, resolved against the working directory.
    #[must_use]
    pub fn moves_path(&self) -> PathBuf {
        self.working_dir.join(&self.moves_file)
    }

    /// Whether the binary's version must be checked before writing moves.
    /// `moved` blocks are applied by the same binary, so the check holds
    /// even when the plan is read from a file.
    #[must_use]
    pub const fn requires_version_check(&self) -> bool {
        matches!(self.output, MoveFormat::Blocks)
    }
}

impl fmt::Display for MoveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::Commands => write!(f, "commands"),
        }
    }
}

impl FromStr for MoveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocks" => Ok(Self::Blocks),
            "commands" => Ok(Self::Commands),
            other => Err(format!("unknown output format '{other}' (expected blocks or commands)")),
        }
    }
}

fn default_terraform_bin() -> String {
    String::from("terraform")
}

fn default_moves_file() -> String {
    String::from("moves.tf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutomvConfig::default();
        assert_eq!(config.terraform_bin, "terraform");
        assert_eq!(config.output, MoveFormat::Blocks);
        assert_eq!(config.moves_file, "moves.tf");
        assert!(config.parallel);
        assert!(!config.show_analysis);
        assert_eq!(config.moves_path(), PathBuf::from("./moves.tf"));
    }

    #[test]
    fn test_move_format_from_str() {
        assert_eq!("blocks".parse::<MoveFormat>(), Ok(MoveFormat::Blocks));
        assert_eq!(" Commands ".parse::<MoveFormat>(), Ok(MoveFormat::Commands));
        assert!("hcl".parse::<MoveFormat>().is_err());
    }

    #[test]
    fn test_version_check_follows_output_format() {
        let mut config = AutomvConfig::default();
        assert!(config.requires_version_check());

        config.output = MoveFormat::Commands;
        assert!(!config.requires_version_check());
    }
}

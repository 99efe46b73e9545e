//! Error types for automv.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration, plan decoding, ignore rules, analysis, and the external
//! planner.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for automv.
#[derive(Debug, Error)]
pub enum AutomvError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan decoding and extraction errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Ignore rule errors.
    #[error("Ignore rule error: {0}")]
    Rule(#[from] RuleError),

    /// Analysis errors.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// External planner errors.
    #[error("Terraform error: {0}")]
    Terraform(#[from] TerraformError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Plan decoding and candidate extraction errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan document could not be decoded.
    #[error("Failed to decode plan: {message}")]
    Parse {
        /// Description of the decode error.
        message: String,
    },

    /// A plan entry is missing identity fields or contradicts itself.
    #[error("Malformed plan entry '{address}': {reason}")]
    Malformed {
        /// Address of the offending entry (may be empty).
        address: String,
        /// What is wrong with the entry.
        reason: String,
    },
}

/// Ignore rule errors.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule string violates the rule grammar.
    #[error("Invalid ignore rule {rule:?}: {reason}")]
    Invalid {
        /// The raw rule string.
        rule: String,
        /// Why the rule was rejected.
        reason: String,
    },
}

/// Analysis errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Two candidates on the same side share an address.
    #[error("Duplicate {side} candidate address: {address}")]
    DuplicateAddress {
        /// Side of the duplicated candidates ("delete" or "create").
        side: String,
        /// The duplicated address.
        address: String,
    },

    /// The run was cancelled before it completed.
    #[error("Analysis cancelled")]
    Cancelled,
}

/// External planner errors.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The planner binary could not be started.
    #[error("Failed to run {bin}: {message}")]
    NotRunnable {
        /// Binary that was invoked.
        bin: String,
        /// Description of the spawn failure.
        message: String,
    },

    /// A planner subcommand exited with a non-zero status.
    #[error("'{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        /// The subcommand that was run.
        command: String,
        /// Exit status code (-1 when killed by a signal).
        status: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The version string reported by the planner could not be parsed.
    #[error("Unrecognized terraform version: {raw}")]
    InvalidVersion {
        /// The raw version string.
        raw: String,
    },

    /// The planner version does not support the requested output.
    #[error("Terraform version {found} does not support {feature} (requires {required} or later)")]
    UnsupportedVersion {
        /// Version that was found.
        found: String,
        /// Minimum version required.
        required: String,
        /// Feature that needs the newer version.
        feature: String,
    },
}

/// Result type alias for automv operations.
pub type Result<T> = std::result::Result<T, AutomvError>;

impl AutomvError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error was caused by the user's input
    /// (configuration, rules, or plan content) rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Rule(_)
                | Self::Plan(_)
                | Self::Analysis(AnalysisError::DuplicateAddress { .. })
        )
    }
}

impl PlanError {
    /// Creates a malformed-entry error.
    #[must_use]
    pub fn malformed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

impl RuleError {
    /// Creates an invalid-rule error.
    #[must_use]
    pub fn invalid(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

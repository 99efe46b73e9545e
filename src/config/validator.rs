//! Configuration validation.
//!
//! This module checks a loaded configuration before any plan work starts,
//! so bad rules or paths fail fast.

use crate::error::{AutomvError, ConfigError, Result};
use crate::ignore::parse_rule;
use std::collections::HashSet;
use tracing::debug;

use super::spec::AutomvConfig;

/// Validator for automv configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &AutomvConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_terraform(config, &mut result);
        Self::validate_moves_file(&config.moves_file, &mut result);
        Self::validate_rules(&config.ignore, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(AutomvError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    fn validate_terraform(config: &AutomvConfig, result: &mut ValidationResult) {
        if config.terraform_bin.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("terraform_bin"),
                message: String::from("Terraform binary cannot be empty"),
            });
        }

        if !config.working_dir.is_dir() {
            result.errors.push(ValidationError {
                field: String::from("working_dir"),
                message: format!(
                    "Working directory '{}' does not exist",
                    config.working_dir.display()
                ),
            });
        }
    }

    fn validate_moves_file(moves_file: &str, result: &mut ValidationResult) {
        if moves_file.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("moves_file"),
                message: String::from("Moves file cannot be empty"),
            });
        } else if !moves_file.ends_with(".tf") {
            result.errors.push(ValidationError {
                field: String::from("moves_file"),
                message: format!("Moves file '{moves_file}' must have a .tf extension"),
            });
        }
    }

    fn validate_rules(rules: &[String], result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, raw) in rules.iter().enumerate() {
            if let Err(e) = parse_rule(raw) {
                result.errors.push(ValidationError {
                    field: format!("ignore[{i}]"),
                    message: e.to_string(),
                });
            } else if !seen.insert(raw.as_str()) {
                result
                    .warnings
                    .push(format!("Ignore rule {raw:?} is listed more than once"));
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

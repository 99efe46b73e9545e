//! Configuration module for automv.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `.automv.yaml`
//! - Environment variable overrides
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{find_config_file, ConfigParser, DEFAULT_CONFIG_FILES};
pub use spec::{AutomvConfig, MoveFormat};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};

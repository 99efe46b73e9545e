// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # automv
//!
//! Finds resources that a plan would destroy and re-create only because
//! their address changed, and emits the moves that avoid it.
//!
//! ## Overview
//!
//! Renaming a resource or moving it into a module makes the planner see a
//! delete of the old address and a create of the new one. automv:
//!
//! - Extracts pure deletes and pure creates from a JSON plan
//! - Diffs the attributes of every same-type (delete, create) pair
//! - Discounts differences covered by user ignore rules
//! - Commits the best pairs greedily and deterministically
//! - Renders the result as `moved` blocks or `state mv` commands
//!
//! ## Modules
//!
//! - [`plan`]: Plan decoding, attribute values and candidate extraction
//! - [`ignore`]: Ignore rule parsing and matching
//! - [`analysis`]: Attribute diffing, pair scoring and matching
//! - [`terraform`]: Planner invocation and move rendering
//! - [`config`]: Configuration parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # .automv.yaml
//! output: blocks
//! moves_file: moves.tf
//! ignore:
//!   - "aws_instance.tags.Name"
//!   - "*.tags_all.**"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod ignore;
pub mod plan;
pub mod terraform;

// ============================================================================
// Re-exports
// ============================================================================

pub use analysis::{analysis_from_plan, moves_from_analysis, Analysis, Analyzer, Move};
pub use cli::{Cli, OutputFormatter};
pub use config::{AutomvConfig, ConfigParser, ConfigValidator};
pub use error::{AutomvError, Result};
pub use ignore::{parse_rule, IgnoreRule, RuleSet};
pub use plan::{extract_candidates, Plan};
pub use terraform::{PlanSource, TerraformRunner};

//! Integration with the external planner.
//!
//! This module runs the planner (or reads a pre-computed plan), checks that
//! its version supports the requested output, and renders moves in the
//! planner's own syntax.

mod render;
mod runner;
mod source;
mod version;

pub use render::{append_moves_to_file, render_moved_blocks, render_state_mv_commands};
pub use runner::TerraformRunner;
pub use source::{analyze_source, FilePlanSource, PlanSource, Progress, TerraformPlanSource};
pub use version::{TerraformVersion, MOVED_BLOCKS_VERSION};

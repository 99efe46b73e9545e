//! Plan sources.
//!
//! A plan either comes from a JSON file computed ahead of time or from
//! running the planner in the working directory.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{Analysis, Analyzer};
use crate::error::{AutomvError, Result};
use crate::plan::Plan;

use super::runner::TerraformRunner;

/// Trait for places a plan can be loaded from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Loads the plan.
    async fn load(&self) -> Result<Plan>;

    /// Describes the source, for progress messages.
    fn describe(&self) -> String;
}

/// Receives human-readable progress lines, one per phase.
pub type Progress = Arc<dyn Fn(&str) + Send + Sync>;

/// Reads a plan from a JSON file.
#[derive(Debug, Clone)]
pub struct FilePlanSource {
    path: PathBuf,
}

/// Produces a plan by running `init`, `plan` and `show`.
#[derive(Clone)]
pub struct TerraformPlanSource {
    runner: TerraformRunner,
    progress: Option<Progress>,
}

impl FilePlanSource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlanSource for FilePlanSource {
    async fn load(&self) -> Result<Plan> {
        info!("Reading plan from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        Plan::from_json(&content)
    }

    fn describe(&self) -> String {
        format!("plan file {}", self.path.display())
    }
}

impl TerraformPlanSource {
    /// Creates a source that plans with `runner`.
    #[must_use]
    pub const fn new(runner: TerraformRunner) -> Self {
        Self {
            runner,
            progress: None,
        }
    }

    /// Reports each planner invocation to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    fn announce(&self, subcommand: &str) {
        let line = format!("Running \"{} {subcommand}\"...", self.runner.bin());
        info!("{line}");
        if let Some(progress) = &self.progress {
            progress(&line);
        }
    }
}

impl fmt::Debug for TerraformPlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerraformPlanSource")
            .field("runner", &self.runner)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[async_trait]
impl PlanSource for TerraformPlanSource {
    async fn load(&self) -> Result<Plan> {
        self.announce("init");
        self.runner.init().await?;

        let plan_file = std::env::temp_dir().join(format!("automv.{}.tfplan", Uuid::new_v4()));

        self.announce("plan");
        let result = match self.runner.plan(&plan_file).await {
            Ok(()) => self.runner.show_json(&plan_file).await,
            Err(e) => Err(e),
        };

        if let Err(e) = tokio::fs::remove_file(&plan_file).await {
            debug!("Could not remove {}: {e}", plan_file.display());
        }

        result
    }

    fn describe(&self) -> String {
        format!("\"{} plan\"", self.runner.bin())
    }
}

/// Loads a plan from `source` and analyzes it off the async runtime,
/// reporting the analysis phase to `progress`.
///
/// # Errors
///
/// Returns an error if loading or analysis fails.
pub async fn analyze_source(
    source: &dyn PlanSource,
    analyzer: Analyzer,
    progress: Option<&Progress>,
) -> Result<Analysis> {
    let plan = source.load().await?;
    debug!("Loaded {} resource changes from {}", plan.resource_changes.len(), source.describe());

    info!("Analysing plan...");
    if let Some(progress) = progress {
        progress("Analysing plan...");
    }

    tokio::task::spawn_blocking(move || analyzer.analyze(&plan))
        .await
        .map_err(|e| AutomvError::internal(format!("analysis task failed: {e}")))?
}

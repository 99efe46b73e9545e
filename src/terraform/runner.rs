//! Invocation of the planner binary.
//!
//! Each subcommand runs to completion with captured output. A non-zero exit
//! status becomes a [`TerraformError::CommandFailed`] carrying stderr.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{PlanError, Result, TerraformError};
use crate::plan::Plan;

use super::version::TerraformVersion;

/// Runs planner subcommands in a working directory.
#[derive(Debug, Clone)]
pub struct TerraformRunner {
    /// Planner binary name or path.
    bin: String,
    /// Directory holding the configuration.
    working_dir: PathBuf,
}

/// Output of `version -json`.
#[derive(Debug, Deserialize)]
struct VersionOutput {
    terraform_version: String,
}

impl TerraformRunner {
    /// Creates a runner for `bin` in `working_dir`.
    #[must_use]
    pub fn new(bin: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            working_dir: working_dir.into(),
        }
    }

    /// The planner binary.
    #[must_use]
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Queries the planner's version.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary cannot be run or its output is not
    /// understood.
    pub async fn version(&self) -> Result<TerraformVersion> {
        let stdout = self.run(&["version", "-json"]).await?;
        parse_version_output(&stdout)
    }

    /// Initializes the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `init` fails.
    pub async fn init(&self) -> Result<()> {
        self.run(&["init", "-input=false"]).await.map(|_| ())
    }

    /// Writes a plan to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if `plan` fails.
    pub async fn plan(&self, out: &Path) -> Result<()> {
        let out_arg = format!("-out={}", out.display());
        self.run(&["plan", "-input=false", "-lock=false", out_arg.as_str()])
            .await
            .map(|_| ())
    }

    /// Renders a saved plan as JSON and decodes it.
    ///
    /// # Errors
    ///
    /// Returns an error if `show` fails or its output is not a valid plan.
    pub async fn show_json(&self, plan_file: &Path) -> Result<Plan> {
        let plan_arg = plan_file.display().to_string();
        let stdout = self.run(&["show", "-json", plan_arg.as_str()]).await?;
        let content = String::from_utf8(stdout).map_err(|e| PlanError::Parse {
            message: format!("plan output is not UTF-8: {e}"),
        })?;
        Plan::from_json(&content)
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let command = format!("{} {}", self.bin, args.join(" "));
        debug!("Running '{command}' in {}", self.working_dir.display());

        let output = Command::new(&self.bin)
            .args(args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TerraformError::NotRunnable {
                bin: self.bin.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TerraformError::CommandFailed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(output.stdout)
    }
}

/// Extracts the version from `version -json` output.
fn parse_version_output(stdout: &[u8]) -> Result<TerraformVersion> {
    let output: VersionOutput =
        serde_json::from_slice(stdout).map_err(|_| TerraformError::InvalidVersion {
            raw: String::from_utf8_lossy(stdout).trim().to_string(),
        })?;
    output.terraform_version.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutomvError;

    #[test]
    fn test_parse_version_output() {
        let stdout = br#"{
            "terraform_version": "1.5.7",
            "platform": "linux_amd64",
            "provider_selections": {},
            "terraform_outdated": true
        }"#;
        assert_eq!(
            parse_version_output(stdout).unwrap(),
            TerraformVersion::new(1, 5, 7)
        );
    }

    #[test]
    fn test_parse_version_output_rejects_text() {
        let err = parse_version_output(b"Terraform v0.11.14").unwrap_err();
        assert!(matches!(
            err,
            AutomvError::Terraform(TerraformError::InvalidVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_not_runnable() {
        let runner = TerraformRunner::new("automv-no-such-terraform-binary", ".");
        let err = runner.version().await.unwrap_err();
        assert!(matches!(
            err,
            AutomvError::Terraform(TerraformError::NotRunnable { .. })
        ));
    }
}

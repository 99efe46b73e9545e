//! automv CLI entrypoint.
//!
//! This is the main entrypoint for the automv command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use automv::analysis::{moves_from_analysis, Analyzer, CancelToken};
use automv::cli::{Cli, OutputFormatter, ReportFormat};
use automv::config::{find_config_file, AutomvConfig, ConfigParser, ConfigValidator, MoveFormat};
use automv::error::Result;
use automv::ignore::RuleSet;
use automv::terraform::{
    analyze_source, append_moves_to_file, render_state_mv_commands, FilePlanSource, PlanSource,
    Progress, TerraformPlanSource, TerraformRunner,
};

use chrono::Utc;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for errors caused by user input.
const USER_ERROR_EXIT: u8 = 2;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Initialize logging
    init_logging(cli.verbose);

    let formatter = OutputFormatter::new(cli.report);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, &formatter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            if e.is_user_error() {
                ExitCode::from(USER_ERROR_EXIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Initializes the logging system. `RUST_LOG` takes precedence.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let config = load_config(&cli, formatter)?;

    // Rules fail fast, before any planner work
    let rules = RuleSet::parse(&config.ignore)?;

    let runner = TerraformRunner::new(&config.terraform_bin, &config.working_dir);

    if config.requires_version_check() {
        let version = runner.version().await?;
        debug!("Terraform version {version}");
        version.require_moved_blocks()?;
    }

    let progress = progress_printer(cli.report);
    let source: Box<dyn PlanSource> = match &cli.plan_file {
        Some(path) => {
            progress(&format!("Reading plan from {}...", path.display()));
            Box::new(FilePlanSource::new(path))
        }
        None => Box::new(TerraformPlanSource::new(runner).with_progress(Arc::clone(&progress))),
    };

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    let analyzer = Analyzer::new(rules)
        .with_parallel(config.parallel)
        .with_cancel_token(cancel);

    let analysis = analyze_source(source.as_ref(), analyzer, Some(&progress)).await?;

    if config.show_analysis {
        eprintln!("{}", formatter.format_analysis(&analysis));
    }

    let moves = moves_from_analysis(&analysis);
    debug!("Move set fingerprint {}", analysis.fingerprint());

    if moves.is_empty() || cli.dry_run {
        eprint!("{}", formatter.format_moves(&moves));
        return Ok(());
    }

    match config.output {
        MoveFormat::Blocks => {
            let path = config.moves_path();
            append_moves_to_file(&path, &moves, Utc::now()).await?;
            eprintln!(
                "{}",
                formatter.success(&format!(
                    "Added {} moved blocks to {}",
                    moves.len(),
                    path.display()
                ))
            );
        }
        MoveFormat::Commands => {
            let commands = render_state_mv_commands(&config.terraform_bin, &moves);
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(commands.as_bytes())?;
            stdout.flush()?;
            eprintln!(
                "{}",
                formatter.info(&format!("Wrote {} commands to standard output.", moves.len()))
            );
        }
    }

    Ok(())
}

/// Loads the configuration file (if any), `.env`, environment overrides and
/// CLI flags, in increasing precedence, then validates the result.
fn load_config(cli: &Cli, formatter: &OutputFormatter) -> Result<AutomvConfig> {
    let config_path = resolve_config_path(cli.config.as_ref())?;

    let base_path = config_path
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let parser = ConfigParser::new().with_base_path(base_path);
    parser.load_dotenv()?;

    let mut config = parser.load_with_env(config_path.as_deref())?;
    cli.apply_to(&mut config);

    let result = ConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        eprintln!("{}", formatter.warning(warning));
    }

    Ok(config)
}

/// Resolves the configuration file path: explicit flag, then search.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = config_path {
        return Ok(Some(path.clone()));
    }
    let cwd = std::env::current_dir()?;
    Ok(find_config_file(cwd))
}

/// Prints progress lines to stderr in the report format.
fn progress_printer(format: ReportFormat) -> Progress {
    Arc::new(move |line: &str| {
        eprintln!("{}", OutputFormatter::new(format).info(line));
    })
}

/// Cancels the analysis on Ctrl-C.
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling analysis");
            cancel.cancel();
        }
    });
}

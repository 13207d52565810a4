//! Shared plumbing for the executables

use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::artifacts::ArtifactWriter;
use crate::config::{RunConfig, RunMode};
use crate::error::E2eResult;
use crate::ledger::Ledger;
use crate::playwright::PlaywrightLauncher;
use crate::runner::{RunReport, ScenarioRunner};
use crate::scenario::Scenario;
use crate::session::SessionLauncher;

/// Directory for the JSON summary and numbered checkpoints
pub const TEST_RESULTS_DIR: &str = "test-results";

/// Directory for README captures
pub const DOCS_IMAGES_DIR: &str = "docs/images";

pub const SUMMARY_FILE: &str = "test-results.json";

/// What a binary runs and where it writes
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub mode: RunMode,
    pub scenarios: Vec<Scenario>,
    pub artifacts_dir: PathBuf,
    /// Ledger destination; `None` writes no summary
    pub summary_path: Option<PathBuf>,
    pub print_summary: bool,
}

pub struct RunOutcome {
    pub ledger: Ledger,
    pub report: RunReport,
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the plan's scenarios, then summarize and flush
pub async fn execute<L: SessionLauncher>(plan: &RunPlan, config: RunConfig, launcher: L) -> E2eResult<RunOutcome> {
    info!("Using base URL: {}", config.base_url);

    let artifacts = ArtifactWriter::new(&plan.artifacts_dir);
    let mut runner = ScenarioRunner::new(config, launcher, artifacts)?;

    let mut ledger = Ledger::new();
    let report = runner.run(&plan.scenarios, &mut ledger).await;

    if plan.print_summary {
        ledger.log_summary();
    }
    if let Some(path) = &plan.summary_path {
        ledger.flush(path)?;
    }
    if !runner.checkpoints().is_empty() {
        info!("📁 {} checkpoint(s) saved to: {}", runner.checkpoints().len(), plan.artifacts_dir.display());
    }

    Ok(RunOutcome { ledger, report })
}

/// Entry point shared by the binaries. Exits 1 when a scenario aborted or the
/// run itself failed.
pub fn run(plan: E2eResult<RunPlan>) -> ExitCode {
    let plan = match plan {
        Ok(plan) => plan,
        Err(e) => {
            error!("Could not load scenarios: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = RunConfig::from_env(plan.mode);
    let result = runtime.block_on(async {
        let launcher = PlaywrightLauncher::new()?;
        execute(&plan, config, launcher).await
    });

    match result {
        Ok(outcome) if outcome.report.success() => ExitCode::SUCCESS,
        Ok(outcome) => {
            error!("Aborted: {}", outcome.report.aborted().join(", "));
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("❌ Test execution error: {}", e);
            record_crash(&plan, &e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Best-effort summary for a run that errored before its own flush
fn record_crash(plan: &RunPlan, message: &str) {
    let Some(path) = &plan.summary_path else {
        return;
    };

    let mut ledger = Ledger::new();
    ledger.fail(format!("Test execution error: {}", message));
    if let Err(e) = ledger.flush(path) {
        warn!("Could not write summary after failure: {}", e);
    }
}

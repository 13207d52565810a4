//! Walkthrough of the welcome screen, theme, backend reachability, load time
//! and a visual capture. Results land in `test-results/`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use jobmatch_e2e::catalog;
use jobmatch_e2e::cli::{self, RunPlan, SUMMARY_FILE, TEST_RESULTS_DIR};
use jobmatch_e2e::RunMode;

/// Comprehensive walkthrough of the job-matching web app.
/// Set E2E_BASE_URL to point at a deployed build.
#[derive(Parser, Debug)]
#[command(name = "comprehensive", version)]
struct Args {}

fn main() -> ExitCode {
    let _ = Args::parse();
    cli::init_logging();

    let plan = catalog::comprehensive().map(|scenario| RunPlan {
        mode: RunMode::Interactive,
        scenarios: vec![scenario],
        artifacts_dir: PathBuf::from(TEST_RESULTS_DIR),
        summary_path: Some(PathBuf::from(TEST_RESULTS_DIR).join(SUMMARY_FILE)),
        print_summary: true,
    });

    let code = cli::run(plan);
    tracing::info!("Flutter web renders to a canvas, so some interactions need manual testing; use the screenshots for visual verification.");
    code
}

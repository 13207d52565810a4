//! Headless acceptance suite: login failure, login success and swipe screen.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use jobmatch_e2e::catalog;
use jobmatch_e2e::cli::{self, RunPlan, SUMMARY_FILE, TEST_RESULTS_DIR};
use jobmatch_e2e::RunMode;

/// Run the login and swipe acceptance scenarios headless.
/// Set E2E_BASE_URL to point at a deployed build.
#[derive(Parser, Debug)]
#[command(name = "e2e-suite", version)]
struct Args {}

fn main() -> ExitCode {
    let _ = Args::parse();
    cli::init_logging();

    let plan = catalog::acceptance_suite().map(|scenarios| RunPlan {
        mode: RunMode::Automated,
        scenarios,
        artifacts_dir: PathBuf::from(TEST_RESULTS_DIR),
        summary_path: Some(PathBuf::from(TEST_RESULTS_DIR).join(SUMMARY_FILE)),
        print_summary: true,
    });

    cli::run(plan)
}

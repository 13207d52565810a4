//! Captures the README screenshots into `docs/images/`.
//!
//! Needs the backend on :8080 and the web build on :8081 (or E2E_BASE_URL).

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use jobmatch_e2e::catalog;
use jobmatch_e2e::cli::{self, RunPlan, DOCS_IMAGES_DIR};
use jobmatch_e2e::RunMode;

/// Capture welcome, login, home and swipe screenshots for the README.
#[derive(Parser, Debug)]
#[command(name = "capture-screenshots", version)]
struct Args {}

fn main() -> ExitCode {
    let _ = Args::parse();
    cli::init_logging();

    let plan = catalog::readme_screenshots().map(|scenario| RunPlan {
        mode: RunMode::Interactive,
        scenarios: vec![scenario],
        artifacts_dir: PathBuf::from(DOCS_IMAGES_DIR),
        summary_path: None,
        print_summary: false,
    });

    cli::run(plan)
}

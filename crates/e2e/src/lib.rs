//! Job-matching app acceptance harness
//!
//! This crate drives the web application through scripted browser journeys
//! and keeps a ledger of what passed, failed or needs a human look:
//! - Resolves a run configuration from `E2E_BASE_URL`
//! - Parses declarative YAML scenarios (welcome → login → home → swipe)
//! - Controls Playwright through a long-lived Node driver process
//! - Writes checkpoint screenshots and a JSON result summary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Acceptance Harness (Rust)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RunConfig::from_env() -> RunConfig                         │
//! │  ScenarioRunner                                              │
//! │    ├── launcher.open() -> Box<dyn BrowserSession>           │
//! │    ├── execute(step) -> StepOutcome (Ok | Warning | Failed) │
//! │    ├── ArtifactWriter::capture(name, png) -> Checkpoint     │
//! │    └── session.close()   (always, exactly once)             │
//! │  Ledger                                                      │
//! │    ├── record(category, message)                            │
//! │    └── flush(test-results/test-results.json)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML)                                            │
//! │    ├── navigate { path, wait_until }                        │
//! │    ├── act { target, action }                               │
//! │    ├── fill { target, value }                               │
//! │    ├── assert_visible { target } / assert_url { pattern }   │
//! │    ├── wait { condition, timeout_ms? }                      │
//! │    ├── screenshot { name }                                  │
//! │    └── evaluate_equals / measure_load / probe_login / note  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod playwright;
pub mod probe;
pub mod runner;
pub mod scenario;
pub mod session;

pub use config::{RunConfig, RunMode};
pub use error::{E2eError, E2eResult};
pub use ledger::Ledger;
pub use runner::{ScenarioRunner, StepOutcome};
pub use scenario::{Scenario, Step};

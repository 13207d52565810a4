//! Scenario runner: sequential step execution against one browser session

use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::artifacts::{ArtifactWriter, Checkpoint};
use crate::config::RunConfig;
use crate::error::{E2eError, E2eResult};
use crate::ledger::Ledger;
use crate::probe::{self, ProbeOutcome};
use crate::scenario::{LoadState, Scenario, Step, StepSpec, WaitCondition};
use crate::session::{BrowserSession, SessionLauncher};

/// What a single step produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Condition held; `Some` is recorded as passed
    Ok(Option<String>),
    Warning(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    ConfigResolved,
    SessionOpen,
    SessionClosing,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::ConfigResolved => "config-resolved",
            RunPhase::SessionOpen => "session-open",
            RunPhase::SessionClosing => "session-closing",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub steps_executed: usize,
    pub ledger_entries: usize,
    pub aborted: bool,
    pub duration_ms: u64,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn aborted(&self) -> Vec<&str> {
        self.scenarios
            .iter()
            .filter(|s| s.aborted)
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn steps_executed(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps_executed).sum()
    }

    pub fn ledger_entries(&self) -> usize {
        self.scenarios.iter().map(|s| s.ledger_entries).sum()
    }

    pub fn success(&self) -> bool {
        self.scenarios.iter().all(|s| !s.aborted)
    }
}

/// Drives scenarios one after another, each in a freshly opened session
pub struct ScenarioRunner<L> {
    config: RunConfig,
    launcher: L,
    artifacts: ArtifactWriter,
    http: reqwest::Client,
    checkpoints: Vec<Checkpoint>,
    /// Every phase entered so far; the last is the current one
    phases: Vec<RunPhase>,
}

impl<L: SessionLauncher> ScenarioRunner<L> {
    pub fn new(config: RunConfig, launcher: L, artifacts: ArtifactWriter) -> E2eResult<Self> {
        let mut runner = Self {
            config,
            launcher,
            artifacts,
            http: probe::client()?,
            checkpoints: Vec::new(),
            phases: vec![RunPhase::Init],
        };
        runner.transition(RunPhase::ConfigResolved);
        Ok(runner)
    }

    pub fn phase(&self) -> RunPhase {
        self.phases.last().copied().unwrap_or(RunPhase::Init)
    }

    /// Phases in the order they were entered
    pub fn phase_history(&self) -> &[RunPhase] {
        &self.phases
    }

    /// Checkpoints written so far, in capture order
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    fn transition(&mut self, next: RunPhase) {
        debug!("run phase: {} -> {}", self.phase(), next);
        self.phases.push(next);
    }

    /// Run scenarios in order, recording every outcome into `ledger`. The run
    /// reaches `Done` once, after the last scenario.
    pub async fn run(&mut self, scenarios: &[Scenario], ledger: &mut Ledger) -> RunReport {
        if self.phase() == RunPhase::Done {
            warn!("Run already finished; ignoring {} scenario(s)", scenarios.len());
            return RunReport::default();
        }
        info!("Running {} scenario(s) against {}", scenarios.len(), self.config.base_url);

        let mut report = RunReport::default();
        for scenario in scenarios {
            let result = self.run_in_session(scenario, ledger).await;
            if result.aborted {
                warn!("✗ {} aborted after {} step(s)", result.name, result.steps_executed);
            } else {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            }
            report.scenarios.push(result);
        }
        self.transition(RunPhase::Done);
        report
    }

    /// Run a single scenario as a whole run
    pub async fn run_scenario(&mut self, scenario: &Scenario, ledger: &mut Ledger) -> ScenarioReport {
        let report = self.run(std::slice::from_ref(scenario), ledger).await;
        report.scenarios.into_iter().next().unwrap_or_else(|| ScenarioReport {
            name: scenario.name.clone(),
            steps_executed: 0,
            ledger_entries: 0,
            aborted: true,
            duration_ms: 0,
        })
    }

    /// Run one scenario in its own session. The session is closed exactly
    /// once on every path after it has been opened.
    async fn run_in_session(&mut self, scenario: &Scenario, ledger: &mut Ledger) -> ScenarioReport {
        let start = Instant::now();
        let entries_before = ledger.len();
        info!("▶ {}", scenario.name);

        let mut session = match self.launcher.open(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                ledger.fail(format!("{}: could not open browser session: {}", scenario.name, e));
                return ScenarioReport {
                    name: scenario.name.clone(),
                    steps_executed: 0,
                    ledger_entries: ledger.len() - entries_before,
                    aborted: true,
                    duration_ms: start.elapsed().as_millis() as u64,
                };
            }
        };
        self.transition(RunPhase::SessionOpen);

        let mut steps_executed = 0;
        let mut aborted = false;

        for spec in &scenario.steps {
            steps_executed += 1;
            debug!("step {}: {}", steps_executed, spec.step.name());

            let (outcome, flow) = self.execute(&mut *session, spec).await;
            match outcome {
                StepOutcome::Ok(Some(message)) => ledger.pass(message),
                StepOutcome::Ok(None) => {}
                StepOutcome::Warning(message) => ledger.warn(message),
                StepOutcome::Failed(message) => ledger.fail(message),
            }

            if flow == Flow::Abort {
                aborted = true;
                break;
            }
        }

        self.transition(RunPhase::SessionClosing);
        if let Err(e) = session.close().await {
            warn!("Closing session for '{}' failed: {}", scenario.name, e);
        }

        ScenarioReport {
            name: scenario.name.clone(),
            steps_executed,
            ledger_entries: ledger.len() - entries_before,
            aborted,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn execute(&mut self, session: &mut dyn BrowserSession, spec: &StepSpec) -> (StepOutcome, Flow) {
        match self.perform(session, spec).await {
            Ok(StepOutcome::Ok(message)) => {
                let records = spec.step.is_check() || spec.label.is_some();
                let message = records.then(|| {
                    message
                        .or_else(|| spec.label.clone())
                        .unwrap_or_else(|| spec.step.name())
                });
                (StepOutcome::Ok(message), Flow::Continue)
            }
            // Soft checks grade themselves and never end the scenario
            Ok(outcome) => (outcome, Flow::Continue),
            Err(e) => classify(spec, e),
        }
    }

    async fn perform(&mut self, session: &mut dyn BrowserSession, spec: &StepSpec) -> E2eResult<StepOutcome> {
        let action_timeout = self.config.default_timeout;
        let expect_timeout = self.config.expect_timeout;

        match &spec.step {
            Step::Navigate { path, wait_until } => {
                let url = self.config.url_for(path);
                session.goto(&url, *wait_until, action_timeout).await?;
            }
            Step::Act { target, action } => {
                session.act(target, *action, action_timeout).await?;
            }
            Step::Fill { target, value } => {
                session.fill(target, &value.resolve(), action_timeout).await?;
            }
            Step::AssertVisible { target } => {
                session.expect_visible(target, expect_timeout).await?;
            }
            Step::AssertUrl { pattern } => {
                session.expect_url(pattern, expect_timeout).await?;
            }
            Step::Wait { condition, timeout_ms } => {
                let timeout = timeout_ms.map(Duration::from_millis).unwrap_or(action_timeout);
                match condition {
                    WaitCondition::LoadState { state } => session.wait_for_load_state(*state, timeout).await?,
                    WaitCondition::Url { pattern } => session.expect_url(pattern, timeout).await?,
                    WaitCondition::Visible { target } => session.expect_visible(target, timeout).await?,
                    WaitCondition::Delay { ms } => session.wait_for_timeout(Duration::from_millis(*ms)).await?,
                }
            }
            Step::Screenshot { name, full_page } => {
                let png = session.screenshot(*full_page).await?;
                let checkpoint = self.artifacts.capture(name, &png)?;
                self.checkpoints.push(checkpoint);
            }
            Step::EvaluateEquals { script, expected } => {
                let actual = session.evaluate(script).await?;
                if &actual != expected {
                    let what = spec.label.clone().unwrap_or_else(|| spec.step.name());
                    return Ok(StepOutcome::Failed(format!(
                        "{}: got {} (expected {})",
                        what, actual, expected
                    )));
                }
            }
            Step::MeasureLoad { path, budget_ms } => {
                let url = self.config.url_for(path);
                let start = Instant::now();
                session.goto(&url, LoadState::NetworkIdle, action_timeout).await?;
                let load_ms = start.elapsed().as_millis() as u64;

                if load_ms >= *budget_ms {
                    return Ok(StepOutcome::Warning(format!(
                        "Page load time: {}ms (target: <{}ms)",
                        load_ms, budget_ms
                    )));
                }
                return Ok(StepOutcome::Ok(Some(format!("Page loads quickly ({}ms)", load_ms))));
            }
            Step::ProbeLogin => {
                let outcome = match probe::probe_login(&self.http, &self.config.api_base_url).await {
                    ProbeOutcome::Responding => StepOutcome::Ok(Some("Backend API is responding".to_string())),
                    ProbeOutcome::UnexpectedStatus(status) => {
                        StepOutcome::Warning(format!("Unexpected API response: {}", status))
                    }
                    ProbeOutcome::Unreachable(e) => StepOutcome::Failed(format!("Backend API not accessible: {}", e)),
                };
                return Ok(outcome);
            }
            Step::Note { message } => {
                return Ok(StepOutcome::Warning(message.clone()));
            }
        }

        Ok(StepOutcome::Ok(None))
    }
}

/// Unmet conditions fail and abort unless the step is optional, in which
/// case they warn. Automation errors always fail and abort.
fn classify(spec: &StepSpec, error: E2eError) -> (StepOutcome, Flow) {
    let what = spec.label.clone().unwrap_or_else(|| spec.step.name());

    if error.is_unmet_condition() {
        let message = format!("{}: expected {}; {}", what, expectation(&spec.step), error);
        if spec.optional {
            (StepOutcome::Warning(message), Flow::Continue)
        } else {
            (StepOutcome::Failed(message), Flow::Abort)
        }
    } else {
        (StepOutcome::Failed(format!("{}: {}", what, error)), Flow::Abort)
    }
}

fn expectation(step: &Step) -> String {
    match step {
        Step::AssertVisible { target } => format!("{} to be visible", target),
        Step::AssertUrl { pattern } => format!("URL matching /{}/i", pattern),
        Step::Act { target, action } => format!("{} to be {}able", target, action.as_str()),
        Step::Fill { target, .. } => format!("{} to be fillable", target),
        Step::Wait { condition, .. } => match condition {
            WaitCondition::LoadState { state } => format!("load state '{}'", state.as_str()),
            WaitCondition::Url { pattern } => format!("URL matching /{}/i", pattern),
            WaitCondition::Visible { target } => format!("{} to be visible", target),
            WaitCondition::Delay { ms } => format!("a {}ms pause", ms),
        },
        Step::Navigate { path, wait_until } => format!("{} to reach '{}'", path, wait_until.as_str()),
        other => format!("{} to succeed", other.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Locator;

    #[test]
    fn test_required_timeout_fails_and_aborts() {
        let spec = StepSpec::from(Step::AssertVisible { target: Locator::text("hi, ") });
        let (outcome, flow) = classify(&spec, E2eError::Timeout("Timeout 5000ms exceeded".into()));

        assert_eq!(flow, Flow::Abort);
        match outcome {
            StepOutcome::Failed(m) => assert!(m.contains("text=/hi, /i to be visible"), "{}", m),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_optional_timeout_warns_and_continues() {
        let spec = StepSpec::from(Step::AssertVisible {
            target: Locator::role("button", "reset all swipes"),
        })
        .optional();
        let (outcome, flow) = classify(&spec, E2eError::Timeout("Timeout 10000ms exceeded".into()));

        assert_eq!(flow, Flow::Continue);
        assert!(matches!(outcome, StepOutcome::Warning(_)));
    }

    #[test]
    fn test_automation_error_aborts_even_when_optional() {
        let spec = StepSpec::from(Step::Navigate { path: "/".into(), wait_until: LoadState::NetworkIdle })
            .optional();
        let (outcome, flow) = classify(&spec, E2eError::Playwright("net::ERR_CONNECTION_REFUSED".into()));

        assert_eq!(flow, Flow::Abort);
        match outcome {
            StepOutcome::Failed(m) => assert!(m.contains("net::ERR_CONNECTION_REFUSED")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_report_accounting() {
        let report = RunReport {
            scenarios: vec![
                ScenarioReport { name: "a".into(), steps_executed: 3, ledger_entries: 2, aborted: false, duration_ms: 1 },
                ScenarioReport { name: "b".into(), steps_executed: 1, ledger_entries: 1, aborted: true, duration_ms: 1 },
            ],
        };
        assert_eq!(report.steps_executed(), 4);
        assert_eq!(report.ledger_entries(), 3);
        assert_eq!(report.aborted(), vec!["b"]);
        assert!(!report.success());
    }
}

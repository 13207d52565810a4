//! Declarative YAML scenarios

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, JOB_SEEKER, RECRUITER};
use crate::error::{E2eError, E2eResult};

/// One linear user journey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<StepSpec>,
}

/// A step plus the fields every step kind shares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(flatten)]
    pub step: Step,

    /// Downgrade an unmet condition to a warning and keep going
    #[serde(default)]
    pub optional: bool,

    /// Ledger message recorded when a check holds
    #[serde(default)]
    pub label: Option<String>,
}

impl From<Step> for StepSpec {
    fn from(step: Step) -> Self {
        StepSpec { step, optional: false, label: None }
    }
}

impl StepSpec {
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the base URL
    Navigate {
        #[serde(default = "default_path")]
        path: String,
        #[serde(default)]
        wait_until: LoadState,
    },

    /// Locate an element and act on it
    Act {
        target: Locator,
        /// Written as `gesture:` since `action:` names the step kind
        #[serde(default, rename = "gesture")]
        action: Action,
    },

    /// Fill an input field
    Fill {
        target: Locator,
        value: FillValue,
    },

    /// Assert an element is visible
    AssertVisible {
        target: Locator,
    },

    /// Assert the page URL matches a pattern
    AssertUrl {
        pattern: String,
    },

    /// Block until a condition holds
    Wait {
        condition: WaitCondition,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Capture a full-page checkpoint
    Screenshot {
        name: String,
        #[serde(default = "default_true")]
        full_page: bool,
    },

    /// Evaluate a script and compare its result
    EvaluateEquals {
        script: String,
        expected: serde_json::Value,
    },

    /// Time a network-idle navigation against a budget
    MeasureLoad {
        #[serde(default = "default_path")]
        path: String,
        budget_ms: u64,
    },

    /// Check the backend login endpoint is reachable
    ProbeLogin,

    /// Record something that needs a human to look at
    Note {
        message: String,
    },
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Load => "load",
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Click,
    Hover,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Click => "click",
            Action::Hover => "hover",
        }
    }
}

/// How an element is found: by accessible role, label, text or CSS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// `name` is a case-insensitive regex
    Role { role: String, name: String },
    Label { pattern: String },
    Text { pattern: String },
    Css { selector: String },
}

impl Locator {
    pub fn role(role: &str, name: &str) -> Self {
        Locator::Role { role: role.to_string(), name: name.to_string() }
    }

    pub fn label(pattern: &str) -> Self {
        Locator::Label { pattern: pattern.to_string() }
    }

    pub fn text(pattern: &str) -> Self {
        Locator::Text { pattern: pattern.to_string() }
    }

    fn pattern(&self) -> Option<&str> {
        match self {
            Locator::Role { name, .. } => Some(name.as_str()),
            Locator::Label { pattern } | Locator::Text { pattern } => Some(pattern.as_str()),
            Locator::Css { .. } => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Role { role, name } => write!(f, "{}[name=/{}/i]", role, name),
            Locator::Label { pattern } => write!(f, "label=/{}/i", pattern),
            Locator::Text { pattern } => write!(f, "text=/{}/i", pattern),
            Locator::Css { selector } => write!(f, "css={}", selector),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitCondition {
    LoadState { state: LoadState },
    Url { pattern: String },
    Visible { target: Locator },
    Delay { ms: u64 },
}

/// A literal value or one of the seeded demo credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Credential { credential: Role, field: CredentialField },
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Recruiter,
}

impl Role {
    pub fn credentials(&self) -> Credentials {
        match self {
            Role::JobSeeker => JOB_SEEKER,
            Role::Recruiter => RECRUITER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    Email,
    Password,
}

impl FillValue {
    pub fn resolve(&self) -> String {
        match self {
            FillValue::Literal(value) => value.clone(),
            FillValue::Credential { credential, field } => {
                let creds = credential.credentials();
                match field {
                    CredentialField::Email => creds.email.to_string(),
                    CredentialField::Password => creds.password.to_string(),
                }
            }
        }
    }
}

impl Step {
    /// Checks always land in the ledger; actions only when they go wrong
    pub fn is_check(&self) -> bool {
        matches!(
            self,
            Step::AssertVisible { .. }
                | Step::AssertUrl { .. }
                | Step::EvaluateEquals { .. }
                | Step::MeasureLoad { .. }
                | Step::ProbeLogin
                | Step::Note { .. }
        )
    }

    /// Short name used in logs and default ledger messages
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { path, .. } => format!("navigate:{}", path),
            Step::Act { target, action } => format!("{}:{}", action.as_str(), target),
            Step::Fill { target, .. } => format!("fill:{}", target),
            Step::AssertVisible { target } => format!("assert_visible:{}", target),
            Step::AssertUrl { pattern } => format!("assert_url:/{}/", pattern),
            Step::Wait { condition, .. } => match condition {
                WaitCondition::LoadState { state } => format!("wait:{}", state.as_str()),
                WaitCondition::Url { pattern } => format!("wait:url=/{}/", pattern),
                WaitCondition::Visible { target } => format!("wait:{}", target),
                WaitCondition::Delay { ms } => format!("wait:{}ms", ms),
            },
            Step::Screenshot { name, .. } => format!("screenshot:{}", name),
            Step::EvaluateEquals { .. } => "evaluate".to_string(),
            Step::MeasureLoad { path, .. } => format!("measure_load:{}", path),
            Step::ProbeLogin => "probe_login".to_string(),
            Step::Note { message } => format!("note:{}", message.chars().take(30).collect::<String>()),
        }
    }

    fn patterns(&self) -> Vec<&str> {
        match self {
            Step::Act { target, .. } | Step::Fill { target, .. } | Step::AssertVisible { target } => {
                target.pattern().into_iter().collect()
            }
            Step::AssertUrl { pattern } => vec![pattern.as_str()],
            Step::Wait { condition, .. } => match condition {
                WaitCondition::Url { pattern } => vec![pattern.as_str()],
                WaitCondition::Visible { target } => target.pattern().into_iter().collect(),
                _ => vec![],
            },
            _ => vec![],
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject scenarios the driver could not run
    pub fn validate(&self) -> E2eResult<()> {
        let invalid = |reason: String| E2eError::InvalidScenario {
            scenario: self.name.clone(),
            reason,
        };

        if self.steps.is_empty() {
            return Err(invalid("no steps".to_string()));
        }

        for (i, spec) in self.steps.iter().enumerate() {
            for pattern in spec.step.patterns() {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| invalid(format!("step {}: bad pattern '{}': {}", i + 1, pattern, e)))?;
            }

            if let Step::Screenshot { name, .. } = &spec.step {
                if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
                    return Err(invalid(format!("step {}: bad checkpoint name '{}'", i + 1, name)));
                }
            }
        }

        Ok(())
    }
}

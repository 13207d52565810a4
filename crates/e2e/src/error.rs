//! Error types for the acceptance harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid scenario '{scenario}': {reason}")]
    InvalidScenario { scenario: String, reason: String },

    #[error("Session already closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Screenshot decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl E2eError {
    /// Whether the error means an expected condition was not observed, as
    /// opposed to the automation layer itself breaking.
    pub fn is_unmet_condition(&self) -> bool {
        matches!(self, E2eError::Timeout(_) | E2eError::AssertionFailed(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

//! Browser session seam between the runner and the automation backend

use async_trait::async_trait;
use std::time::Duration;

use crate::config::RunConfig;
use crate::error::E2eResult;
use crate::scenario::{Action, LoadState, Locator};

/// One open browser page. Every call suspends until the browser reports
/// back or `timeout` elapses.
///
/// Implementations return [`E2eError::Timeout`](crate::E2eError::Timeout) or
/// [`E2eError::AssertionFailed`](crate::E2eError::AssertionFailed) when a
/// condition is not met, and any other error when the automation layer
/// itself breaks.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to an absolute URL
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration) -> E2eResult<()>;

    async fn act(&mut self, target: &Locator, action: Action, timeout: Duration) -> E2eResult<()>;

    async fn fill(&mut self, target: &Locator, value: &str, timeout: Duration) -> E2eResult<()>;

    async fn expect_visible(&mut self, target: &Locator, timeout: Duration) -> E2eResult<()>;

    /// Wait until the page URL matches `pattern`
    async fn expect_url(&mut self, pattern: &str, timeout: Duration) -> E2eResult<()>;

    async fn wait_for_load_state(&mut self, state: LoadState, timeout: Duration) -> E2eResult<()>;

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&mut self, script: &str) -> E2eResult<serde_json::Value>;

    /// Capture the page as PNG bytes
    async fn screenshot(&mut self, full_page: bool) -> E2eResult<Vec<u8>>;

    /// Release the browser. Called exactly once per opened session.
    async fn close(&mut self) -> E2eResult<()>;
}

/// Opens sessions for the runner
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn open(&self, config: &RunConfig) -> E2eResult<Box<dyn BrowserSession>>;
}

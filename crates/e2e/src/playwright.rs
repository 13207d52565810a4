//! Playwright browser automation
//!
//! A small Node driver (`driver.js`) owns the browser for the lifetime of a
//! session. Rust sends it one JSON command per line on stdin and reads one
//! JSON reply per line from stdout, so every step of a scenario runs against
//! the same page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, trace, warn};

use crate::config::RunConfig;
use crate::error::{E2eError, E2eResult};
use crate::scenario::{Action, LoadState, Locator};
use crate::session::{BrowserSession, SessionLauncher};

const DRIVER_SCRIPT: &str = include_str!("driver.js");

/// Slack on top of a command's own timeout before the driver is presumed hung
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum DriverCommand<'a> {
    Goto { url: &'a str, wait_until: LoadState, timeout_ms: u64 },
    Act { target: &'a Locator, action: Action, timeout_ms: u64 },
    Fill { target: &'a Locator, value: &'a str, timeout_ms: u64 },
    ExpectVisible { target: &'a Locator, timeout_ms: u64 },
    ExpectUrl { pattern: &'a str, timeout_ms: u64 },
    WaitForLoadState { state: LoadState, timeout_ms: u64 },
    WaitForTimeout { ms: u64 },
    Evaluate { script: &'a str },
    Screenshot { full_page: bool },
    Close,
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    command: DriverCommand<'a>,
}

#[derive(Debug, Deserialize)]
struct DriverResponse {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl DriverResponse {
    fn into_result(self) -> E2eResult<serde_json::Value> {
        if self.ok {
            return Ok(self.value);
        }
        let message = self.message.unwrap_or_else(|| "unknown driver error".to_string());
        match self.kind.as_deref() {
            Some("timeout") => Err(E2eError::Timeout(message)),
            Some("assertion") => Err(E2eError::AssertionFailed(message)),
            _ => Err(E2eError::Playwright(message)),
        }
    }
}

/// Launches a Node driver per session
#[derive(Debug, Clone)]
pub struct PlaywrightLauncher {
    /// Where `require('playwright')` is resolved from
    node_modules: PathBuf,
}

impl PlaywrightLauncher {
    /// Resolve Playwright from `./node_modules`
    pub fn new() -> E2eResult<Self> {
        Ok(Self {
            node_modules: std::env::current_dir()?.join("node_modules"),
        })
    }

    pub fn with_node_modules(node_modules: impl Into<PathBuf>) -> Self {
        Self { node_modules: node_modules.into() }
    }

    /// Check if Playwright is installed
    async fn check_playwright_installed() -> E2eResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn node_path(&self) -> E2eResult<std::ffi::OsString> {
        let mut paths = vec![self.node_modules.clone()];
        if let Some(existing) = std::env::var_os("NODE_PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths)
            .map_err(|e| E2eError::Playwright(format!("invalid NODE_PATH: {}", e)))
    }
}

#[async_trait]
impl SessionLauncher for PlaywrightLauncher {
    async fn open(&self, config: &RunConfig) -> E2eResult<Box<dyn BrowserSession>> {
        Self::check_playwright_installed().await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        info!(
            "Launching {} ({}, {}x{})",
            config.browser.as_str(),
            if config.headless { "headless" } else { "headed" },
            config.viewport.width,
            config.viewport.height,
        );

        let mut child = Command::new("node")
            .arg(&script_path)
            .current_dir(script_dir.path())
            .env("NODE_PATH", self.node_path()?)
            .env("E2E_DRIVER_BROWSER", config.browser.as_str())
            .env("E2E_DRIVER_HEADLESS", if config.headless { "1" } else { "0" })
            .env("E2E_DRIVER_VIEWPORT_WIDTH", config.viewport.width.to_string())
            .env("E2E_DRIVER_VIEWPORT_HEIGHT", config.viewport.height.to_string())
            .env("E2E_DRIVER_DEFAULT_TIMEOUT_MS", millis(config.default_timeout).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;

        let mut session = PlaywrightSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            closed: false,
            default_timeout: config.default_timeout,
            _script_dir: script_dir,
        };

        // The driver announces itself with id 0 once the page exists
        match tokio::time::timeout(config.default_timeout, session.read_response(0)).await {
            Ok(Ok(_)) => {
                debug!("Playwright driver ready");
                Ok(Box::new(session))
            }
            Ok(Err(e)) => {
                session.terminate().await;
                Err(e)
            }
            Err(_) => {
                session.terminate().await;
                Err(E2eError::Playwright("driver did not become ready".to_string()))
            }
        }
    }
}

/// A browser page owned by a Node driver process
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    closed: bool,
    /// Bound for commands that carry no timeout of their own
    default_timeout: Duration,
    _script_dir: TempDir,
}

impl PlaywrightSession {
    async fn request(&mut self, command: DriverCommand<'_>, timeout: Duration) -> E2eResult<serde_json::Value> {
        if self.closed {
            return Err(E2eError::SessionClosed);
        }

        let id = self.next_id;
        self.next_id += 1;

        let line = serde_json::to_string(&Envelope { id, command })?;
        trace!("driver <- {}", line);

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        match tokio::time::timeout(timeout + RESPONSE_GRACE, self.read_response(id)).await {
            Ok(response) => response?.into_result(),
            Err(_) => Err(E2eError::Playwright(format!(
                "driver unresponsive after {} ms",
                millis(timeout + RESPONSE_GRACE)
            ))),
        }
    }

    async fn read_response(&mut self, id: u64) -> E2eResult<DriverResponse> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Playwright("driver exited unexpectedly".to_string()))?;
            trace!("driver -> {}", line);

            // Anything that is not a reply (stray console output) is skipped
            let response: DriverResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(_) => continue,
            };

            if response.id == id {
                return Ok(response);
            }
            warn!("Discarding out-of-order driver reply {} (waiting for {})", response.id, id);
        }
    }

    /// SIGTERM first so the browser can shut down, then kill
    async fn terminate(&mut self) {
        if self.send_sigterm()
            && tokio::time::timeout(Duration::from_millis(500), self.child.wait())
                .await
                .is_ok()
        {
            return;
        }

        let _ = self.child.kill().await;
    }

    #[cfg(unix)]
    fn send_sigterm(&self) -> bool {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        match self.child.id() {
            Some(pid) => kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok(),
            None => false,
        }
    }

    #[cfg(not(unix))]
    fn send_sigterm(&self) -> bool {
        false
    }
}

#[async_trait]
impl BrowserSession for PlaywrightSession {
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::Goto { url, wait_until, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn act(&mut self, target: &Locator, action: Action, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::Act { target, action, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn fill(&mut self, target: &Locator, value: &str, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::Fill { target, value, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn expect_visible(&mut self, target: &Locator, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::ExpectVisible { target, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn expect_url(&mut self, pattern: &str, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::ExpectUrl { pattern, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn wait_for_load_state(&mut self, state: LoadState, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = millis(timeout);
        self.request(DriverCommand::WaitForLoadState { state, timeout_ms }, timeout).await?;
        Ok(())
    }

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()> {
        self.request(DriverCommand::WaitForTimeout { ms: millis(duration) }, duration).await?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> E2eResult<serde_json::Value> {
        let timeout = self.default_timeout;
        self.request(DriverCommand::Evaluate { script }, timeout).await
    }

    async fn screenshot(&mut self, full_page: bool) -> E2eResult<Vec<u8>> {
        use base64::Engine;

        let timeout = self.default_timeout;
        let value = self.request(DriverCommand::Screenshot { full_page }, timeout).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| E2eError::Playwright("screenshot reply was not a string".to_string()))?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }

        let graceful = self.request(DriverCommand::Close, CLOSE_TIMEOUT).await;
        self.closed = true;

        if let Err(e) = graceful {
            warn!("Driver did not close cleanly: {}", e);
            self.terminate().await;
            return Ok(());
        }

        match tokio::time::timeout(CLOSE_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => debug!("Driver exited with {}", status),
            _ => self.terminate().await,
        }
        Ok(())
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let target = Locator::role("button", "^sign in$");
        let line = serde_json::to_value(Envelope {
            id: 7,
            command: DriverCommand::Act { target: &target, action: Action::Click, timeout_ms: 30000 },
        })
        .unwrap();

        assert_eq!(
            line,
            serde_json::json!({
                "id": 7,
                "cmd": "act",
                "target": { "by": "role", "role": "button", "name": "^sign in$" },
                "action": "click",
                "timeout_ms": 30000
            })
        );
    }

    #[test]
    fn test_load_state_wire_format() {
        let line = serde_json::to_value(Envelope {
            id: 1,
            command: DriverCommand::WaitForLoadState { state: LoadState::NetworkIdle, timeout_ms: 5 },
        })
        .unwrap();
        assert_eq!(line["cmd"], "wait_for_load_state");
        assert_eq!(line["state"], "networkidle");
    }

    #[test]
    fn test_response_mapping() {
        let timeout: DriverResponse =
            serde_json::from_str(r#"{"id":3,"ok":false,"kind":"timeout","message":"Timeout 5000ms exceeded"}"#)
                .unwrap();
        assert!(matches!(timeout.into_result(), Err(E2eError::Timeout(_))));

        let broken: DriverResponse =
            serde_json::from_str(r#"{"id":3,"ok":false,"kind":"error","message":"net::ERR_CONNECTION_REFUSED"}"#)
                .unwrap();
        assert!(matches!(broken.into_result(), Err(E2eError::Playwright(m)) if m.contains("REFUSED")));

        let mismatch: DriverResponse = serde_json::from_str(
            r#"{"id":5,"ok":false,"kind":"assertion","message":"expected URL matching /home/i, got http://localhost:8081/login"}"#,
        )
        .unwrap();
        let err = mismatch.into_result().unwrap_err();
        assert!(err.is_unmet_condition());
        assert!(matches!(err, E2eError::AssertionFailed(m) if m.ends_with("/login")));

        let ok: DriverResponse = serde_json::from_str(r##"{"id":4,"ok":true,"value":"#0ea5e9"}"##).unwrap();
        assert_eq!(ok.into_result().unwrap(), serde_json::json!("#0ea5e9"));
    }

    #[test]
    fn test_driver_emits_every_error_kind() {
        for kind in ["'timeout'", "'assertion'", "'error'"] {
            assert!(DRIVER_SCRIPT.contains(kind), "driver never reports {}", kind);
        }
        assert!(DRIVER_SCRIPT.contains("throw new AssertionError(`expected URL matching"));
    }
}

//! Run configuration resolved from the environment

use std::time::Duration;

/// Environment variable overriding the application origin
pub const BASE_URL_ENV: &str = "E2E_BASE_URL";

/// Origin of the Flutter web build when run locally
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Origin of the Go backend; not overridable
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// How a run is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Headless, used by the acceptance suite
    Automated,
    /// Headed, used by the capture and walkthrough scripts
    Interactive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 1280, height: 720 }
    }
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Origin of the web application under test
    pub base_url: String,

    /// Origin of the backend API (used by the liveness probe)
    pub api_base_url: String,

    pub viewport: Viewport,

    pub headless: bool,

    pub browser: Browser,

    /// Timeout for actions and navigation
    pub default_timeout: Duration,

    /// Timeout for visibility and URL assertions
    pub expect_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            viewport: Viewport::default(),
            headless: true,
            browser: Browser::Chromium,
            default_timeout: Duration::from_secs(30),
            expect_timeout: Duration::from_secs(5),
        }
    }
}

impl RunConfig {
    /// Resolve a config through `lookup`. Never fails: missing or empty
    /// values fall back to the defaults.
    pub fn resolve<F>(lookup: F, mode: RunMode) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            headless: mode == RunMode::Automated,
            ..Self::default()
        }
    }

    /// Resolve from the process environment
    pub fn from_env(mode: RunMode) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), mode)
    }

    /// Join a path onto the base URL. Absolute URLs pass through unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.is_empty() || path == "/" {
            return format!("{}/", self.base_url);
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Demo account seeded by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub email: &'static str,
    pub password: &'static str,
}

pub const JOB_SEEKER: Credentials = Credentials {
    email: "jobseeker@demo.com",
    password: "demo123",
};

pub const RECRUITER: Credentials = Credentials {
    email: "recruiter@demo.com",
    password: "demo123",
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_override() {
        let config = RunConfig::resolve(lookup_from(&[]), RunMode::Automated);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.viewport, Viewport { width: 1280, height: 720 });
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert_eq!(config.expect_timeout, Duration::from_secs(5));
        assert!(config.headless);
    }

    #[test]
    fn test_env_override_and_trailing_slash() {
        let config = RunConfig::resolve(
            lookup_from(&[(BASE_URL_ENV, "https://staging.example.app/")]),
            RunMode::Interactive,
        );
        assert_eq!(config.base_url, "https://staging.example.app");
        assert!(!config.headless);
    }

    #[test]
    fn test_empty_override_falls_back() {
        let config = RunConfig::resolve(lookup_from(&[(BASE_URL_ENV, "  ")]), RunMode::Automated);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_url_for() {
        let config = RunConfig::default();
        assert_eq!(config.url_for("/"), "http://localhost:8081/");
        assert_eq!(config.url_for("/login"), "http://localhost:8081/login");
        assert_eq!(config.url_for("home"), "http://localhost:8081/home");
        assert_eq!(config.url_for("https://other.test/x"), "https://other.test/x");
    }
}

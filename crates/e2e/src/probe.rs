//! Backend liveness probe against the login endpoint

use std::time::Duration;
use tracing::{debug, warn};

use crate::error::E2eResult;

pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// What the login endpoint told us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Bad credentials were rejected with 400 or 401
    Responding,
    /// The endpoint answered with some other status
    UnexpectedStatus(u16),
    /// The request never got an answer
    Unreachable(String),
}

/// Build the client the probe uses
pub fn client() -> E2eResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Send a deliberately invalid credential pair to the login endpoint. Single
/// attempt.
pub async fn probe_login(client: &reqwest::Client, api_base_url: &str) -> ProbeOutcome {
    let url = format!("{}{}", api_base_url.trim_end_matches('/'), LOGIN_PATH);
    debug!("Probing {}", url);

    let body = serde_json::json!({ "email": "test", "password": "test" });

    match client.get(&url).json(&body).send().await {
        Ok(resp) => match resp.status().as_u16() {
            400 | 401 => ProbeOutcome::Responding,
            other => {
                warn!("Login probe returned {}", other);
                ProbeOutcome::UnexpectedStatus(other)
            }
        },
        Err(e) => ProbeOutcome::Unreachable(e.to_string()),
    }
}

//! Built-in scenarios shipped with the harness

use crate::error::E2eResult;
use crate::scenario::Scenario;

const COMPREHENSIVE: &str = include_str!("../scenarios/comprehensive.yaml");
const README_SCREENSHOTS: &str = include_str!("../scenarios/readme_screenshots.yaml");
const LOGIN_WRONG_PASSWORD: &str = include_str!("../scenarios/login_wrong_password.yaml");
const LOGIN_SUCCESS: &str = include_str!("../scenarios/login_success.yaml");
const SWIPE: &str = include_str!("../scenarios/swipe.yaml");

/// Welcome screen, theme colour, API probe, load time and visual capture
pub fn comprehensive() -> E2eResult<Scenario> {
    Scenario::from_yaml(COMPREHENSIVE)
}

/// Welcome → login → home → swipe captures for `docs/images`
pub fn readme_screenshots() -> E2eResult<Scenario> {
    Scenario::from_yaml(README_SCREENSHOTS)
}

/// Login and swipe acceptance scenarios, each run in a fresh session
pub fn acceptance_suite() -> E2eResult<Vec<Scenario>> {
    [LOGIN_WRONG_PASSWORD, LOGIN_SUCCESS, SWIPE]
        .into_iter()
        .map(Scenario::from_yaml)
        .collect()
}

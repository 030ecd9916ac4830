//! Shared fixtures for the collectivo end-to-end suite.
//!
//! Tests run against a deployment described entirely by environment
//! variables: the WebDriver hub via `WD_*` (see `wd-session`) and the
//! targets under test via `E2E_*`. Nothing is hardcoded in test bodies.

pub mod cli;
pub mod commands;
pub mod logging;

use anyhow::Context;
use tracing::warn;
use url::Url;
use wd::{Session, SessionConfig};

/// Application root when `E2E_APP_URL` is unset. The docker-compose setup
/// runs the browser in a container, so the host app is reached through
/// `host.docker.internal`.
pub const DEFAULT_APP_URL: &str = "http://host.docker.internal:3000";

/// Identity-provider root when `E2E_KEYCLOAK_URL` is unset.
pub const DEFAULT_KEYCLOAK_URL: &str = "http://keycloak:8080";

/// Resolved target URLs for one suite run.
#[derive(Debug, Clone)]
pub struct SuiteUrls {
	/// Application root (serves the sign-in page).
	pub app: String,
	/// Keycloak root (serves the admin login page).
	pub keycloak: String,
}

/// Reads and validates the target URLs from the environment.
pub fn suite_urls() -> anyhow::Result<SuiteUrls> {
	Ok(SuiteUrls {
		app: target_url("E2E_APP_URL", DEFAULT_APP_URL)?,
		keycloak: target_url("E2E_KEYCLOAK_URL", DEFAULT_KEYCLOAK_URL)?,
	})
}

/// Session configuration for one suite run, from `WD_*` variables.
pub fn session_config() -> anyhow::Result<SessionConfig> {
	SessionConfig::from_env().context("invalid WD_* session configuration")
}

/// Runs `body` inside an open session, closing it on both the success and
/// the error path. Tests own no driver fields; they borrow the session for
/// the scope of one check.
pub async fn with_session<T, F>(config: SessionConfig, body: F) -> anyhow::Result<T>
where
	F: AsyncFnOnce(&Session) -> anyhow::Result<T>,
{
	let mut session = Session::new(config);
	session.open().await?;

	let outcome = body(&session).await;
	let closed = session.close().await;

	match (outcome, closed) {
		(Ok(value), Ok(())) => Ok(value),
		(Ok(_), Err(close_err)) => Err(close_err.into()),
		(Err(body_err), Ok(())) => Err(body_err),
		(Err(body_err), Err(close_err)) => {
			warn!(target = "e2e", error = %close_err, "session close failed after test failure");
			Err(body_err)
		}
	}
}

fn target_url(var: &str, default: &str) -> anyhow::Result<String> {
	let raw = std::env::var(var)
		.ok()
		.filter(|value| !value.is_empty())
		.unwrap_or_else(|| default.to_string());
	Url::parse(&raw).with_context(|| format!("{var} is not a valid URL: '{raw}'"))?;
	Ok(raw)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_targets_are_valid_urls() {
		for default in [DEFAULT_APP_URL, DEFAULT_KEYCLOAK_URL] {
			assert!(Url::parse(default).is_ok(), "bad default: {default}");
		}
	}
}

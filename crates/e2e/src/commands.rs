//! Subcommand implementations for the suite binary.

use anyhow::Context;
use serde_json::{Value, json};
use tracing::info;
use url::Url;
use wd::Teardown;

use crate::{session_config, suite_urls, with_session};

/// Probes the hub's `/status` endpoint and fails when it is not ready.
pub async fn status() -> anyhow::Result<()> {
	let config = session_config()?;
	let status_url = hub_status_url(config.endpoint())?;
	info!(target = "e2e", url = %status_url, "probing hub status");

	let response = reqwest::get(status_url.clone())
		.await
		.with_context(|| format!("hub status request to {status_url} failed"))?;
	let body: Value = response
		.json()
		.await
		.context("hub status response was not JSON")?;

	let ready = body
		.pointer("/value/ready")
		.and_then(Value::as_bool)
		.unwrap_or(false);
	let message = body
		.pointer("/value/message")
		.and_then(Value::as_str)
		.unwrap_or_default();

	println!(
		"{}",
		serde_json::to_string_pretty(&json!({ "ready": ready, "message": message }))?
	);
	anyhow::ensure!(ready, "hub at {status_url} is not ready");
	Ok(())
}

/// Opens a session, loads the application root, reports the title, closes.
pub async fn check() -> anyhow::Result<()> {
	let urls = suite_urls()?;
	let title = with_session(session_config()?, async |session| {
		session.goto(&urls.app).await?;
		Ok(session.title().await?)
	})
	.await?;

	println!("page title: {title}");
	Ok(())
}

/// Prints the resolved session configuration and target URLs as JSON.
pub async fn config() -> anyhow::Result<()> {
	let config = session_config()?;
	let urls = suite_urls()?;

	let doc = json!({
		"driver": config.driver,
		"browser": config.browser,
		"headless": config.headless,
		"no_sandbox": config.no_sandbox,
		"disable_dev_shm": config.disable_dev_shm,
		"allow_origins": config.allow_origins,
		"wait_timeout_ms": config.wait_timeout.as_millis() as u64,
		"poll_interval_ms": config.poll_interval.as_millis() as u64,
		"keep_session": config.teardown == Teardown::LeaveOpen,
		"targets": { "app": urls.app, "keycloak": urls.keycloak },
	});

	println!("{}", serde_json::to_string_pretty(&doc)?);
	Ok(())
}

/// Status endpoint for a hub or driver URL, tolerating both bare roots and
/// `/wd/hub`-style prefixes.
fn hub_status_url(endpoint: &str) -> anyhow::Result<Url> {
	let mut url = Url::parse(endpoint).with_context(|| format!("invalid endpoint '{endpoint}'"))?;
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	Ok(url.join("status")?)
}

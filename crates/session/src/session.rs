//! Remote browser session lifecycle and command surface.

use std::time::Duration;

use thirtyfour::WebDriver;
use thirtyfour::error::WebDriverError;
use tracing::{debug, info};

use crate::config::{SessionConfig, Teardown};
use crate::error::{Error, Result};
use crate::wait::{self, WaitOutcome, WaitPredicate};

/// Lifecycle states a session moves through.
///
/// `Unopened → Open → Closed`, in one direction only. A failed open leaves
/// the session Unopened so the caller can inspect and retry deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Unopened,
	Open,
	Closed,
}

impl SessionState {
	fn name(self) -> &'static str {
		match self {
			SessionState::Unopened => "unopened",
			SessionState::Open => "open",
			SessionState::Closed => "closed",
		}
	}
}

enum State {
	Unopened,
	Open(WebDriver),
	Closed,
}

impl State {
	fn kind(&self) -> SessionState {
		match self {
			State::Unopened => SessionState::Unopened,
			State::Open(_) => SessionState::Open,
			State::Closed => SessionState::Closed,
		}
	}
}

/// A handle to one remote browser session.
///
/// Owns the underlying driver connection while open. Commands other than
/// [`Session::open`] and [`Session::close`] are only valid in the Open state
/// and fail with [`Error::InvalidState`] otherwise.
pub struct Session {
	config: SessionConfig,
	state: State,
}

impl Session {
	/// Creates an unopened session from a fully owned configuration.
	pub fn new(config: SessionConfig) -> Self {
		Self {
			config,
			state: State::Unopened,
		}
	}

	/// Configuration this session was created with.
	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SessionState {
		self.state.kind()
	}

	/// Connects to the configured endpoint and negotiates the capability set.
	///
	/// On connection failure the session stays Unopened and the error names
	/// the endpoint; the caller surfaces it rather than retrying silently.
	pub async fn open(&mut self) -> Result<()> {
		if !matches!(self.state, State::Unopened) {
			return Err(Error::InvalidState {
				operation: "open",
				state: self.state.kind().name(),
			});
		}

		let endpoint = self.config.endpoint().to_string();
		let capabilities = self.config.capabilities()?;
		debug!(
			target = "wd",
			endpoint = %endpoint,
			browser = %self.config.browser,
			"opening session"
		);

		let driver = WebDriver::new(endpoint.as_str(), capabilities)
			.await
			.map_err(|source| Error::Connection { endpoint: endpoint.clone(), source })?;

		info!(target = "wd", endpoint = %endpoint, "session open");
		self.state = State::Open(driver);
		Ok(())
	}

	/// Loads the given URL in the remote browser.
	///
	/// Failures reaching the host are reported as connection failures; pages
	/// the browser reached but could not load are navigation failures.
	pub async fn goto(&self, url: &str) -> Result<()> {
		let driver = self.driver("navigate")?;
		debug!(target = "wd", url = %url, "navigate");
		driver.goto(url).await.map_err(|source| {
			if is_connection_failure(&source) {
				Error::Connection {
					endpoint: url.to_string(),
					source,
				}
			} else {
				Error::Navigation {
					url: url.to_string(),
					source,
				}
			}
		})
	}

	/// Polls a predicate with the configured default timeout.
	pub async fn wait_for(&self, predicate: &WaitPredicate) -> Result<WaitOutcome> {
		self.wait_for_within(predicate, self.config.wait_timeout).await
	}

	/// Polls a predicate with an explicit timeout.
	///
	/// A predicate that already holds returns on the first check. On expiry
	/// the error names the predicate and the timeout.
	pub async fn wait_for_within(
		&self,
		predicate: &WaitPredicate,
		timeout: Duration,
	) -> Result<WaitOutcome> {
		let driver = self.driver("wait")?;
		debug!(
			target = "wd",
			predicate = %predicate,
			timeout_ms = timeout.as_millis() as u64,
			"waiting"
		);

		let interval = self.config.poll_interval;
		match wait::poll_until(timeout, interval, async || wait::evaluate(driver, predicate).await)
			.await?
		{
			Some(outcome) => Ok(outcome),
			None => Err(Error::Timeout {
				predicate: predicate.to_string(),
				timeout,
			}),
		}
	}

	/// Current page title.
	pub async fn title(&self) -> Result<String> {
		let driver = self.driver("title")?;
		Ok(driver.title().await?)
	}

	/// Releases the session according to the configured teardown.
	///
	/// Idempotent: safe from any state, and the session ends Closed even if
	/// the remote quit command fails, so a retry cannot double-release.
	pub async fn close(&mut self) -> Result<()> {
		match std::mem::replace(&mut self.state, State::Closed) {
			State::Open(driver) => match self.config.teardown {
				Teardown::Release => {
					debug!(target = "wd", "quitting remote session");
					driver.quit().await?;
					Ok(())
				}
				Teardown::LeaveOpen => {
					info!(target = "wd", "leaving remote session open for inspection");
					drop(driver);
					Ok(())
				}
			},
			State::Unopened | State::Closed => Ok(()),
		}
	}

	fn driver(&self, operation: &'static str) -> Result<&WebDriver> {
		match &self.state {
			State::Open(driver) => Ok(driver),
			other => Err(Error::InvalidState {
				operation,
				state: other.kind().name(),
			}),
		}
	}
}

/// True when the driver's failure reads as "could not reach the host" rather
/// than "reached it and the page failed". The wire protocol reports both
/// through the same channel, so this goes by the message.
fn is_connection_failure(err: &WebDriverError) -> bool {
	let message = err.to_string();
	message.contains("error sending request")
		|| message.contains("Connection refused")
		|| message.contains("ERR_CONNECTION_REFUSED")
		|| message.contains("ERR_NAME_NOT_RESOLVED")
		|| message.contains("ERR_ADDRESS_UNREACHABLE")
		|| message.contains("dns error")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::SessionConfig;

	fn unopened() -> Session {
		Session::new(SessionConfig::default())
	}

	#[tokio::test]
	async fn commands_before_open_are_invalid_state() {
		let session = unopened();

		let err = session.goto("http://localhost:3000").await.unwrap_err();
		assert!(err.is_invalid_state());
		assert!(err.to_string().contains("navigate"));

		let err = session.title().await.unwrap_err();
		assert!(err.is_invalid_state());

		let err = session
			.wait_for(&WaitPredicate::title_is("anything"))
			.await
			.unwrap_err();
		assert!(err.is_invalid_state());
		assert!(err.to_string().contains("unopened"));
	}

	#[tokio::test]
	async fn close_without_open_is_a_noop_that_ends_closed() {
		let mut session = unopened();
		assert_eq!(session.state(), SessionState::Unopened);

		session.close().await.unwrap();
		assert_eq!(session.state(), SessionState::Closed);

		// A second close stays a no-op.
		session.close().await.unwrap();
		assert_eq!(session.state(), SessionState::Closed);
	}

	#[tokio::test]
	async fn commands_after_close_are_invalid_state() {
		let mut session = unopened();
		session.close().await.unwrap();

		let err = session.goto("http://localhost:3000").await.unwrap_err();
		assert!(err.is_invalid_state());
		assert!(err.to_string().contains("closed"));
	}

	#[tokio::test]
	async fn open_is_rejected_once_closed() {
		let mut session = unopened();
		session.close().await.unwrap();

		let err = session.open().await.unwrap_err();
		assert!(err.is_invalid_state());
		assert!(err.to_string().contains("open is not valid"));
	}
}

//! Error types for the session helper.

use std::time::Duration;

use thirtyfour::error::WebDriverError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a remote browser session.
#[derive(Debug, Error)]
pub enum Error {
	/// The automation endpoint or target host was unreachable or refused the
	/// connection.
	#[error("connection failed: {endpoint}")]
	Connection {
		/// URL the connection was attempted against.
		endpoint: String,
		#[source]
		source: WebDriverError,
	},

	/// The remote browser failed to load the requested page.
	#[error("navigation failed: {url}")]
	Navigation {
		/// URL the browser was asked to load.
		url: String,
		#[source]
		source: WebDriverError,
	},

	/// A wait predicate was never satisfied within the timeout.
	#[error("timeout after {}ms waiting for: {predicate}", timeout.as_millis())]
	Timeout {
		/// Rendered form of the predicate that was being polled.
		predicate: String,
		/// Timeout that elapsed.
		timeout: Duration,
	},

	/// An operation was issued against a session in the wrong state.
	#[error("{operation} is not valid while the session is {state}")]
	InvalidState {
		operation: &'static str,
		state: &'static str,
	},

	/// An environment variable held a value the configuration cannot use.
	#[error("invalid environment configuration {var}: {reason}")]
	Env { var: String, reason: String },

	/// Any other WebDriver command failure.
	#[error(transparent)]
	WebDriver(#[from] WebDriverError),
}

impl Error {
	/// Returns true if this is a wait timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout { .. })
	}

	/// Returns true if this is a connection failure.
	pub fn is_connection(&self) -> bool {
		matches!(self, Error::Connection { .. })
	}

	/// Returns true if this is a session-state violation.
	pub fn is_invalid_state(&self) -> bool {
		matches!(self, Error::InvalidState { .. })
	}
}

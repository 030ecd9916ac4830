//! Session configuration and capability building.
//!
//! Everything here is resolved before a session opens; the session keeps its
//! own copy, so a config can be reused across suites without aliasing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thirtyfour::{Capabilities, ChromiumLikeCapabilities, DesiredCapabilities};
use url::Url;

use crate::error::{Error, Result};

/// Default Selenium hub endpoint.
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:4444/wd/hub";
/// Default endpoint of a driver binary running on this machine.
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:9515";

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser engine the capability set selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
	#[default]
	Chrome,
	Firefox,
}

impl fmt::Display for BrowserKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BrowserKind::Chrome => f.write_str("chrome"),
			BrowserKind::Firefox => f.write_str("firefox"),
		}
	}
}

impl FromStr for BrowserKind {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"chrome" => Ok(BrowserKind::Chrome),
			"firefox" => Ok(BrowserKind::Firefox),
			other => Err(format!("unknown browser '{other}' (expected chrome or firefox)")),
		}
	}
}

/// Where session commands are sent.
///
/// The two variants carry the same payload but select different deployment
/// shapes: a shared hub/grid, or a driver binary on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DriverTarget {
	/// Selenium hub or grid speaking the remote wire protocol.
	Remote { url: String },
	/// Driver binary (chromedriver, geckodriver) running locally.
	Local { url: String },
}

impl DriverTarget {
	/// Remote target at the default hub address.
	pub fn default_remote() -> Self {
		DriverTarget::Remote {
			url: DEFAULT_REMOTE_URL.to_string(),
		}
	}

	/// Local target at the default driver address.
	pub fn default_local() -> Self {
		DriverTarget::Local {
			url: DEFAULT_LOCAL_URL.to_string(),
		}
	}

	/// Endpoint URL commands are sent to.
	pub fn url(&self) -> &str {
		match self {
			DriverTarget::Remote { url } | DriverTarget::Local { url } => url,
		}
	}
}

impl Default for DriverTarget {
	fn default() -> Self {
		Self::default_remote()
	}
}

/// What happens to the remote browser when the session closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Teardown {
	/// Quit the remote browser on close.
	#[default]
	Release,
	/// Leave the remote session running for manual inspection; the server's
	/// idle timeout reaps it eventually.
	LeaveOpen,
}

/// Fully owned session configuration.
///
/// Immutable once a session opens: [`crate::Session`] stores its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
	/// Endpoint the session is opened against.
	pub driver: DriverTarget,
	/// Browser engine requested from the endpoint.
	pub browser: BrowserKind,
	/// Run the browser without a visible window.
	pub headless: bool,
	/// Pass `--no-sandbox` (required in most containerized deployments).
	pub no_sandbox: bool,
	/// Pass `--disable-dev-shm-usage` (avoids tiny /dev/shm in containers).
	pub disable_dev_shm: bool,
	/// Value for `--remote-allow-origins`; `None` omits the switch.
	pub allow_origins: Option<String>,
	/// Default timeout for [`crate::Session::wait_for`].
	pub wait_timeout: Duration,
	/// Fixed interval between wait-predicate checks.
	pub poll_interval: Duration,
	/// Close behavior.
	pub teardown: Teardown,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			driver: DriverTarget::default(),
			browser: BrowserKind::default(),
			headless: true,
			no_sandbox: true,
			disable_dev_shm: true,
			allow_origins: Some("*".to_string()),
			wait_timeout: DEFAULT_WAIT_TIMEOUT,
			poll_interval: DEFAULT_POLL_INTERVAL,
			teardown: Teardown::default(),
		}
	}
}

impl SessionConfig {
	/// Config for a remote hub at the given URL, defaults elsewhere.
	pub fn remote(url: impl Into<String>) -> Self {
		Self {
			driver: DriverTarget::Remote { url: url.into() },
			..Self::default()
		}
	}

	/// Config for a local driver binary at the given URL, defaults elsewhere.
	pub fn local(url: impl Into<String>) -> Self {
		Self {
			driver: DriverTarget::Local { url: url.into() },
			..Self::default()
		}
	}

	/// Loads configuration from `WD_*` environment variables.
	///
	/// Unset variables fall back to defaults; set-but-invalid values fail
	/// with [`Error::Env`] rather than being silently ignored.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`SessionConfig::from_env`] with an injectable variable source.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let defaults = Self::default();

		let mode = match get(&lookup, "WD_DRIVER_MODE") {
			None => None,
			Some(raw) => match raw.to_ascii_lowercase().as_str() {
				"remote" => Some(DriverTarget::default_remote()),
				"local" => Some(DriverTarget::default_local()),
				other => {
					return Err(Error::Env {
						var: "WD_DRIVER_MODE".to_string(),
						reason: format!("unknown mode '{other}' (expected remote or local)"),
					});
				}
			},
		};
		let mut driver = mode.unwrap_or_default();
		if let Some(raw) = get(&lookup, "WD_ENDPOINT") {
			validate_url("WD_ENDPOINT", &raw)?;
			driver = match driver {
				DriverTarget::Remote { .. } => DriverTarget::Remote { url: raw },
				DriverTarget::Local { .. } => DriverTarget::Local { url: raw },
			};
		}

		let browser = match get(&lookup, "WD_BROWSER") {
			None => defaults.browser,
			Some(raw) => raw.parse().map_err(|reason| Error::Env {
				var: "WD_BROWSER".to_string(),
				reason,
			})?,
		};

		let teardown = if get_bool(&lookup, "WD_KEEP_SESSION", false)? {
			Teardown::LeaveOpen
		} else {
			Teardown::Release
		};

		Ok(Self {
			driver,
			browser,
			headless: get_bool(&lookup, "WD_HEADLESS", defaults.headless)?,
			no_sandbox: get_bool(&lookup, "WD_NO_SANDBOX", defaults.no_sandbox)?,
			disable_dev_shm: get_bool(&lookup, "WD_DISABLE_DEV_SHM", defaults.disable_dev_shm)?,
			allow_origins: get(&lookup, "WD_ALLOW_ORIGINS").or(defaults.allow_origins),
			wait_timeout: get_millis(&lookup, "WD_WAIT_TIMEOUT_MS", defaults.wait_timeout)?,
			poll_interval: get_millis(&lookup, "WD_POLL_INTERVAL_MS", defaults.poll_interval)?,
			teardown,
		})
	}

	/// Endpoint URL the session will be opened against.
	pub fn endpoint(&self) -> &str {
		self.driver.url()
	}

	/// Builds the capability set negotiated at session creation.
	pub fn capabilities(&self) -> Result<Capabilities> {
		match self.browser {
			BrowserKind::Chrome => {
				let mut caps = DesiredCapabilities::chrome();
				if self.headless {
					caps.set_headless()?;
				}
				if self.no_sandbox {
					caps.set_no_sandbox()?;
				}
				if self.disable_dev_shm {
					caps.set_disable_dev_shm_usage()?;
				}
				if let Some(origins) = &self.allow_origins {
					caps.add_arg(&format!("--remote-allow-origins={origins}"))?;
				}
				Ok(caps.into())
			}
			BrowserKind::Firefox => {
				// The remaining flags are Chromium switches; Firefox only
				// honors headless.
				let mut caps = DesiredCapabilities::firefox();
				if self.headless {
					caps.set_headless()?;
				}
				Ok(caps.into())
			}
		}
	}
}

fn get(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
	lookup(name).filter(|value| !value.is_empty())
}

fn get_bool(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> Result<bool> {
	match get(lookup, name) {
		None => Ok(default),
		Some(raw) => match raw.to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" | "on" => Ok(true),
			"0" | "false" | "no" | "off" => Ok(false),
			other => Err(Error::Env {
				var: name.to_string(),
				reason: format!("expected a boolean, got '{other}'"),
			}),
		},
	}
}

fn get_millis(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &str,
	default: Duration,
) -> Result<Duration> {
	match get(lookup, name) {
		None => Ok(default),
		Some(raw) => {
			let ms: u64 = raw.parse().map_err(|_| Error::Env {
				var: name.to_string(),
				reason: format!("expected milliseconds, got '{raw}'"),
			})?;
			Ok(Duration::from_millis(ms))
		}
	}
}

fn validate_url(var: &str, raw: &str) -> Result<()> {
	Url::parse(raw).map_err(|err| Error::Env {
		var: var.to_string(),
		reason: format!("'{raw}' is not a valid URL: {err}"),
	})?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
		let map: HashMap<&str, &str> = vars.iter().copied().collect();
		move |name| map.get(name).map(|v| v.to_string())
	}

	#[test]
	fn defaults_target_the_remote_hub() {
		let config = SessionConfig::from_lookup(lookup(&[])).unwrap();
		assert_eq!(config.endpoint(), DEFAULT_REMOTE_URL);
		assert_eq!(config.browser, BrowserKind::Chrome);
		assert_eq!(config.wait_timeout, Duration::from_secs(10));
		assert_eq!(config.poll_interval, Duration::from_millis(250));
		assert_eq!(config.teardown, Teardown::Release);
	}

	#[test]
	fn local_mode_switches_the_default_endpoint() {
		let config = SessionConfig::from_lookup(lookup(&[("WD_DRIVER_MODE", "local")])).unwrap();
		assert_eq!(config.driver, DriverTarget::default_local());
	}

	#[test]
	fn explicit_endpoint_keeps_the_selected_mode() {
		let config = SessionConfig::from_lookup(lookup(&[
			("WD_DRIVER_MODE", "local"),
			("WD_ENDPOINT", "http://127.0.0.1:9516"),
		]))
		.unwrap();
		assert_eq!(
			config.driver,
			DriverTarget::Local {
				url: "http://127.0.0.1:9516".to_string()
			}
		);
	}

	#[test]
	fn overrides_are_parsed() {
		let config = SessionConfig::from_lookup(lookup(&[
			("WD_BROWSER", "firefox"),
			("WD_HEADLESS", "false"),
			("WD_WAIT_TIMEOUT_MS", "3000"),
			("WD_POLL_INTERVAL_MS", "100"),
			("WD_KEEP_SESSION", "true"),
		]))
		.unwrap();
		assert_eq!(config.browser, BrowserKind::Firefox);
		assert!(!config.headless);
		assert_eq!(config.wait_timeout, Duration::from_millis(3000));
		assert_eq!(config.poll_interval, Duration::from_millis(100));
		assert_eq!(config.teardown, Teardown::LeaveOpen);
	}

	#[test]
	fn malformed_values_fail_instead_of_falling_back() {
		let err = SessionConfig::from_lookup(lookup(&[("WD_HEADLESS", "maybe")])).unwrap_err();
		assert!(err.to_string().contains("WD_HEADLESS"));

		let err = SessionConfig::from_lookup(lookup(&[("WD_BROWSER", "netscape")])).unwrap_err();
		assert!(err.to_string().contains("netscape"));

		let err = SessionConfig::from_lookup(lookup(&[("WD_ENDPOINT", "not a url")])).unwrap_err();
		assert!(err.to_string().contains("WD_ENDPOINT"));

		let err =
			SessionConfig::from_lookup(lookup(&[("WD_WAIT_TIMEOUT_MS", "soon")])).unwrap_err();
		assert!(err.to_string().contains("WD_WAIT_TIMEOUT_MS"));
	}

	#[test]
	fn chrome_capabilities_carry_the_configured_flags() {
		let caps = SessionConfig::default().capabilities().unwrap();
		let value = serde_json::to_value(&caps).unwrap();
		assert_eq!(value["browserName"], "chrome");

		let args = value["goog:chromeOptions"]["args"].as_array().unwrap();
		let has = |flag: &str| args.iter().any(|a| a.as_str() == Some(flag));
		assert!(has("--no-sandbox"));
		assert!(has("--disable-dev-shm-usage"));
		assert!(has("--remote-allow-origins=*"));
		assert!(
			args.iter()
				.any(|a| a.as_str().is_some_and(|s| s.starts_with("--headless")))
		);
	}

	#[test]
	fn disabled_flags_are_omitted() {
		let config = SessionConfig {
			headless: false,
			no_sandbox: false,
			disable_dev_shm: false,
			allow_origins: None,
			..SessionConfig::default()
		};
		let value = serde_json::to_value(&config.capabilities().unwrap()).unwrap();
		let args = value["goog:chromeOptions"]["args"]
			.as_array()
			.cloned()
			.unwrap_or_default();
		assert!(args.is_empty(), "unexpected args: {args:?}");
	}

	#[test]
	fn firefox_capabilities_select_the_firefox_backend() {
		let config = SessionConfig {
			browser: BrowserKind::Firefox,
			..SessionConfig::default()
		};
		let value = serde_json::to_value(&config.capabilities().unwrap()).unwrap();
		assert_eq!(value["browserName"], "firefox");
	}

	#[test]
	fn browser_kind_round_trips_through_strings() {
		for kind in [BrowserKind::Chrome, BrowserKind::Firefox] {
			assert_eq!(kind.to_string().parse::<BrowserKind>().unwrap(), kind);
		}
	}
}

//! Wait predicates and the fixed-interval poll loop.

use std::fmt;
use std::time::Duration;

use thirtyfour::error::{WebDriverError, WebDriverErrorInner};
use thirtyfour::{By, WebDriver, WebElement};
use tokio::time::Instant;

use crate::error::Result;

/// A condition over current page state, polled until it holds or a timeout
/// elapses.
#[derive(Debug, Clone)]
pub enum WaitPredicate {
	/// An element matching the locator is present in the DOM.
	ElementLocated(By),
	/// An element matching the locator is present and displayed.
	ElementVisible(By),
	/// The page title equals the given string.
	TitleIs(String),
	/// The page title contains the given fragment.
	TitleContains(String),
}

impl WaitPredicate {
	/// Title-equality predicate.
	pub fn title_is(title: impl Into<String>) -> Self {
		WaitPredicate::TitleIs(title.into())
	}

	/// Title-substring predicate.
	pub fn title_contains(fragment: impl Into<String>) -> Self {
		WaitPredicate::TitleContains(fragment.into())
	}
}

impl fmt::Display for WaitPredicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WaitPredicate::ElementLocated(by) => write!(f, "element located by {by:?}"),
			WaitPredicate::ElementVisible(by) => write!(f, "element visible by {by:?}"),
			WaitPredicate::TitleIs(title) => write!(f, "title is '{title}'"),
			WaitPredicate::TitleContains(fragment) => write!(f, "title contains '{fragment}'"),
		}
	}
}

/// What a satisfied predicate yields.
#[derive(Debug)]
pub enum WaitOutcome {
	/// The element that satisfied an element predicate.
	Element(WebElement),
	/// A page-state predicate held; there is no element to return.
	Satisfied,
}

impl WaitOutcome {
	/// Matched element, when the predicate was an element predicate.
	pub fn element(&self) -> Option<&WebElement> {
		match self {
			WaitOutcome::Element(element) => Some(element),
			WaitOutcome::Satisfied => None,
		}
	}

	/// Consumes the outcome, returning the matched element when present.
	pub fn into_element(self) -> Option<WebElement> {
		match self {
			WaitOutcome::Element(element) => Some(element),
			WaitOutcome::Satisfied => None,
		}
	}
}

/// Evaluates a predicate against current page state.
///
/// `Ok(None)` means "not yet": the element is absent, went stale between
/// lookup and inspection, or the title does not match. Anything else the
/// driver reports is a real failure and propagates.
pub(crate) async fn evaluate(
	driver: &WebDriver,
	predicate: &WaitPredicate,
) -> Result<Option<WaitOutcome>> {
	match predicate {
		WaitPredicate::ElementLocated(by) => match driver.find(by.clone()).await {
			Ok(element) => Ok(Some(WaitOutcome::Element(element))),
			Err(err) if element_pending(&err) => Ok(None),
			Err(err) => Err(err.into()),
		},
		WaitPredicate::ElementVisible(by) => match driver.find(by.clone()).await {
			Ok(element) => match element.is_displayed().await {
				Ok(true) => Ok(Some(WaitOutcome::Element(element))),
				Ok(false) => Ok(None),
				Err(err) if element_pending(&err) => Ok(None),
				Err(err) => Err(err.into()),
			},
			Err(err) if element_pending(&err) => Ok(None),
			Err(err) => Err(err.into()),
		},
		WaitPredicate::TitleIs(expected) => {
			let title = driver.title().await?;
			Ok((title == *expected).then_some(WaitOutcome::Satisfied))
		}
		WaitPredicate::TitleContains(fragment) => {
			let title = driver.title().await?;
			Ok(title.contains(fragment.as_str()).then_some(WaitOutcome::Satisfied))
		}
	}
}

fn element_pending(err: &WebDriverError) -> bool {
	matches!(
		err.as_inner(),
		WebDriverErrorInner::NoSuchElement(_) | WebDriverErrorInner::StaleElementReference(_)
	)
}

/// Polls `check` at a fixed interval until it yields a value or `timeout`
/// elapses, with one final check at the deadline.
///
/// Returns `Ok(None)` on expiry; the caller decides how to report it. An
/// already-satisfied check returns on the first evaluation without sleeping.
pub(crate) async fn poll_until<T, F>(
	timeout: Duration,
	interval: Duration,
	mut check: F,
) -> Result<Option<T>>
where
	F: AsyncFnMut() -> Result<Option<T>>,
{
	let deadline = Instant::now() + timeout;
	loop {
		if let Some(value) = check().await? {
			return Ok(Some(value));
		}
		let now = Instant::now();
		if now >= deadline {
			return Ok(None);
		}
		tokio::time::sleep(interval.min(deadline - now)).await;
	}
}

//! wd-session: a remote WebDriver session helper with configurable wait
//! semantics.
//!
//! Wraps one browser session behind an explicit `Unopened → Open → Closed`
//! lifecycle: connect to a remote automation endpoint with a declarative
//! capability set, navigate, poll wait predicates against page state, and
//! release the session deterministically on close. The wire protocol itself
//! belongs to [`thirtyfour`] and the automation server; this crate only adds
//! the session discipline the tests rely on.
//!
//! # Example
//!
//! ```ignore
//! use wd::{Session, SessionConfig, WaitPredicate};
//!
//! #[tokio::main]
//! async fn main() -> wd::Result<()> {
//!     let mut session = Session::new(SessionConfig::from_env()?);
//!     session.open().await?;
//!
//!     session.goto("http://keycloak:8080").await?;
//!     session
//!         .wait_for(&WaitPredicate::title_is("Welcome to Keycloak"))
//!         .await?;
//!     assert_eq!(session.title().await?, "Welcome to Keycloak");
//!
//!     session.close().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod wait;

pub use config::{BrowserKind, DriverTarget, SessionConfig, Teardown};
pub use error::{Error, Result};
pub use session::{Session, SessionState};
pub use wait::{WaitOutcome, WaitPredicate};

// Selector and element types reused from the underlying client.
pub use thirtyfour::{By, WebElement};

pub mod prelude {
	pub use crate::config::{BrowserKind, DriverTarget, SessionConfig, Teardown};
	pub use crate::error::{Error, Result};
	pub use crate::session::{Session, SessionState};
	pub use crate::wait::{WaitOutcome, WaitPredicate};
	pub use thirtyfour::By;
}

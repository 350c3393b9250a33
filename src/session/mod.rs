//! Rendering-session abstraction over the browser engine.
//!
//! The load-more loop only ever sees this trait; the closed set of
//! pagination-end signals is expressed as the `Ok` variants of the probe,
//! click, and wait outcomes. Everything else the engine can report is a
//! [`SessionError`], which is always fatal and never absorbed by the loop.

pub mod chrome;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use chrome::ChromeSession;

/// Fatal session-level failure. None of these are pagination signals.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("script evaluation failed: {0}")]
    Eval(String),

    #[error("browser backend fault: {0}")]
    Backend(String),
}

/// Outcome of probing for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Found,
    NotFound,
}

/// Outcome of activating an element.
///
/// `Blocked` covers every way a present element can refuse interaction:
/// hidden, zero-sized, disabled, or covered by another element at its
/// center point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Clicked,
    Blocked,
}

/// Outcome of a bounded wait for content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentWait {
    Appeared,
    TimedOut,
}

/// One rendering session against the catalog - enables mocking for tests.
///
/// A session owns exactly one page. Navigation state persists across calls,
/// so the orchestrator can reuse one session for every catalog section.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates the session's page to `url` and waits for the load.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Checks whether `selector` currently matches an element.
    async fn probe(&mut self, selector: &str) -> Result<Probe, SessionError>;

    /// Clicks the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<Click, SessionError>;

    /// Polls until `selector` matches at least one element, or `timeout`
    /// elapses.
    async fn wait_for(&mut self, selector: &str, timeout: Duration)
        -> Result<ContentWait, SessionError>;

    /// Returns the full rendered markup of the current page.
    async fn page_html(&mut self) -> Result<String, SessionError>;

    /// Tears the session down. Idempotent; safe on every exit path.
    async fn close(&mut self) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::Navigation {
            url: "https://example.com/".to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/"));
        assert!(msg.contains("ERR_NAME_NOT_RESOLVED"));

        let err = SessionError::Launch("no chrome binary".to_string());
        assert!(err.to_string().contains("launch"));
    }

    #[test]
    fn test_outcomes_are_comparable() {
        assert_eq!(Probe::Found, Probe::Found);
        assert_ne!(Probe::Found, Probe::NotFound);
        assert_ne!(Click::Clicked, Click::Blocked);
        assert_ne!(ContentWait::Appeared, ContentWait::TimedOut);
    }
}

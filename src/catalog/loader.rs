//! Drives the load-more pagination loop until the page is fully expanded.
//!
//! The loop ends only on one of three page-side signals: the trigger element
//! is gone, the trigger refuses the click, or freshly requested content never
//! shows up. Any session fault is returned to the caller unchanged.

use crate::catalog::selectors::page;
use crate::config::Config;
use crate::session::{Click, ContentWait, PageSession, Probe, SessionError};
use std::time::Duration;
use tracing::debug;

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEnd {
    /// No load-more trigger on the page.
    TriggerMissing,
    /// The trigger is present but not clickable.
    TriggerBlocked,
    /// The click landed but no content arrived in time.
    ContentWaitExpired,
}

impl std::fmt::Display for LoadEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoadEnd::TriggerMissing => "trigger missing",
            LoadEnd::TriggerBlocked => "trigger blocked",
            LoadEnd::ContentWaitExpired => "content wait expired",
        };
        write!(f, "{s}")
    }
}

/// Fully expanded page markup, plus how the expansion ended.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
    pub end: LoadEnd,
    /// Completed load-more rounds. Zero means the initial render was final.
    pub cycles: u32,
}

/// Runs the navigate / settle / click / wait loop for one catalog page.
pub struct ContentLoader {
    settle: Duration,
    content_wait: Duration,
}

impl ContentLoader {
    pub fn new(settle: Duration, content_wait: Duration) -> Self {
        Self {
            settle,
            content_wait,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_millis(config.settle_ms),
            Duration::from_millis(config.content_wait_ms),
        )
    }

    /// Navigates to `url` and clicks the load-more trigger until the page
    /// signals completion, then captures the expanded markup.
    pub async fn load(
        &self,
        session: &mut dyn PageSession,
        url: &str,
    ) -> Result<PageSnapshot, SessionError> {
        session.navigate(url).await?;

        let mut cycles = 0u32;
        let end = loop {
            // Let the last batch of cards render before the next probe.
            tokio::time::sleep(self.settle).await;

            match session.probe(page::MORE_BUTTON).await? {
                Probe::NotFound => break LoadEnd::TriggerMissing,
                Probe::Found => {}
            }

            match session.click(page::MORE_BUTTON).await? {
                Click::Blocked => break LoadEnd::TriggerBlocked,
                Click::Clicked => {}
            }

            match session.wait_for(page::CARD, self.content_wait).await? {
                ContentWait::TimedOut => break LoadEnd::ContentWaitExpired,
                ContentWait::Appeared => {
                    cycles += 1;
                    debug!(url, cycles, "load-more cycle complete");
                }
            }
        };

        let html = session.page_html().await?;
        debug!(url, cycles, %end, "pagination ended");

        Ok(PageSnapshot {
            url: url.to_string(),
            html,
            end,
            cycles,
        })
    }
}

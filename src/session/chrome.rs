//! Headless-Chrome implementation of [`PageSession`] via chromiumoxide.

use super::{Click, ContentWait, PageSession, Probe, SessionError};
use crate::config::Config;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// How often [`PageSession::wait_for`] re-checks the page.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Locates a Chrome/Chromium binary on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    for name in ["google-chrome", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let app = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if app.exists() {
            return Some(app);
        }
    }

    None
}

/// A live Chrome session owning one page for the whole crawl.
pub struct ChromeSession {
    page: Page,
    browser: Browser,
    handler: JoinHandle<()>,
    nav_timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// Launches Chrome and opens a blank page.
    pub async fn launch(config: &Config) -> Result<Self, SessionError> {
        let chrome = match &config.chrome_path {
            Some(path) => path.clone(),
            None => find_chrome().ok_or_else(|| {
                SessionError::Launch(
                    "no Chrome binary found; set chrome_path in config or CATALOG_CHROME"
                        .to_string(),
                )
            })?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        builder = if config.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        let browser_config = builder
            .build()
            .map_err(|e| SessionError::Launch(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Launch(format!("failed to open page: {e}")))?;

        debug!(headless = config.headless, "browser session started");

        Ok(Self {
            page,
            browser,
            handler: handler_task,
            nav_timeout: Duration::from_millis(config.nav_timeout_ms),
            closed: false,
        })
    }

    async fn eval<T>(&self, script: &str) -> Result<T, SessionError>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| SessionError::Eval(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| SessionError::Eval(format!("result conversion: {e}")))
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        debug!(url, "navigating");
        let result = tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await;

        match result {
            Ok(Ok(_)) => {
                // Let in-flight subresources land before the caller probes.
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => Err(SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(SessionError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {}ms", self.nav_timeout.as_millis()),
            }),
        }
    }

    async fn probe(&mut self, selector: &str) -> Result<Probe, SessionError> {
        let found: bool = self.eval(&probe_script(selector)).await?;
        Ok(if found { Probe::Found } else { Probe::NotFound })
    }

    async fn click(&mut self, selector: &str) -> Result<Click, SessionError> {
        let outcome: String = self.eval(&click_script(selector)).await?;
        match outcome.as_str() {
            "clicked" => Ok(Click::Clicked),
            // "missing" means the element vanished between probe and click;
            // the interaction is refused either way.
            "blocked" | "missing" => Ok(Click::Blocked),
            other => Err(SessionError::Eval(format!(
                "unexpected click outcome: {other}"
            ))),
        }
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ContentWait, SessionError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Probe::Found = self.probe(selector).await? {
                return Ok(ContentWait::Appeared);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(ContentWait::TimedOut);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn page_html(&mut self) -> Result<String, SessionError> {
        self.eval("document.documentElement.outerHTML").await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Page::close consumes; the handle is a cheap clone of the same page.
        let _ = self.page.clone().close().await;
        let _ = self.browser.close().await;
        self.handler.abort();

        debug!("browser session closed");
        Ok(())
    }
}

fn probe_script(selector: &str) -> String {
    format!(
        "document.querySelector('{}') !== null",
        js_string(selector)
    )
}

/// Builds a click script that reports how the element refused, if it did.
///
/// An element is considered blocked when it is disabled, hidden, has no
/// box, or when another element covers its center point.
fn click_script(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector('{}');
            if (!el) {{ return 'missing'; }}
            el.scrollIntoView({{ block: 'center' }});
            if (el.disabled) {{ return 'blocked'; }}
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden' || style.pointerEvents === 'none') {{
                return 'blocked';
            }}
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) {{ return 'blocked'; }}
            const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
            if (hit !== el && !el.contains(hit) && !(hit && hit.contains(el))) {{
                return 'blocked';
            }}
            el.click();
            return 'clicked';
        }})()"#,
        js_string(selector)
    )
}

/// Escapes a string for safe injection into a JS string literal.
fn js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}

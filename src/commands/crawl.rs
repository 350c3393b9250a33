//! Crawl command implementation.

use crate::catalog::{ContentLoader, Extractor, LoadEnd, Section};
use crate::config::Config;
use crate::export::Exporter;
use crate::session::{ChromeSession, PageSession};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of crawling one section.
pub struct SectionReport {
    pub section: Section,
    pub records: usize,
    pub cycles: u32,
    pub end: LoadEnd,
    pub path: PathBuf,
}

/// Executes a catalog crawl across the configured sections.
pub struct CrawlCommand {
    config: Config,
}

impl CrawlCommand {
    /// Creates a new crawl command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Launches a browser session, runs the crawl, and returns a summary.
    pub async fn execute(&self) -> Result<String> {
        let mut session = ChromeSession::launch(&self.config)
            .await
            .context("Failed to launch browser")?;

        let result = self.execute_with_session(&mut session).await;

        // Teardown runs whether the crawl succeeded or not.
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        result
    }

    /// Runs the crawl with a provided session (for testing).
    pub async fn execute_with_session(&self, session: &mut dyn PageSession) -> Result<String> {
        let sections: Vec<Section> = if self.config.sections.is_empty() {
            Section::all().to_vec()
        } else {
            self.config.sections.clone()
        };

        let loader = ContentLoader::from_config(&self.config);
        let extractor = Extractor::from_config(&self.config);
        let exporter = Exporter::from_config(&self.config);

        let mut reports = Vec::with_capacity(sections.len());
        for section in sections {
            let url = self.config.section_url(section);
            info!("Crawling section {}: {}", section, url);

            let snapshot = loader
                .load(session, &url)
                .await
                .with_context(|| format!("Failed to load section {}", section))?;

            let products = extractor
                .extract(&snapshot)
                .with_context(|| format!("Failed to extract records from section {}", section))?;

            let path = exporter
                .write_section(section, &products)
                .with_context(|| format!("Failed to write section {}", section))?;

            info!(
                "Section {}: {} records after {} load-more cycles ({})",
                section,
                products.len(),
                snapshot.cycles,
                snapshot.end
            );

            reports.push(SectionReport {
                section,
                records: products.len(),
                cycles: snapshot.cycles,
                end: snapshot.end,
                path,
            });
        }

        Ok(Self::summary(&reports))
    }

    fn summary(reports: &[SectionReport]) -> String {
        let mut lines = Vec::with_capacity(reports.len() + 1);

        for report in reports {
            lines.push(format!(
                "{}: {} records, {} cycles ({}) -> {}",
                report.section,
                report.records,
                report.cycles,
                report.end,
                report.path.display()
            ));
        }

        let total: usize = reports.iter().map(|r| r.records).sum();
        lines.push(format!("Total: {} records across {} sections", total, reports.len()));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::session::{Click, ContentWait, Probe, SessionError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::time::Duration;

    #[derive(Debug)]
    enum Step {
        Probe(Probe),
        Click(Click),
        Wait(ContentWait),
    }

    /// Serves scripted pagination outcomes and one HTML document per
    /// navigation.
    struct MockSession {
        steps: VecDeque<Step>,
        htmls: VecDeque<String>,
        current_html: String,
        navigated: Vec<String>,
        fail_navigation_at: Option<usize>,
        closed: bool,
    }

    impl MockSession {
        fn new(steps: Vec<Step>, htmls: Vec<String>) -> Self {
            Self {
                steps: steps.into(),
                htmls: htmls.into(),
                current_html: String::new(),
                navigated: Vec::new(),
                fail_navigation_at: None,
                closed: false,
            }
        }
    }

    #[async_trait]
    impl PageSession for MockSession {
        async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
            if self.fail_navigation_at == Some(self.navigated.len()) {
                return Err(SessionError::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_CONNECTION_REFUSED".to_string(),
                });
            }
            self.navigated.push(url.to_string());
            self.current_html = self.htmls.pop_front().expect("no scripted page left");
            Ok(())
        }

        async fn probe(&mut self, _selector: &str) -> Result<Probe, SessionError> {
            match self.steps.pop_front() {
                Some(Step::Probe(p)) => Ok(p),
                other => panic!("unexpected probe, script step was {other:?}"),
            }
        }

        async fn click(&mut self, _selector: &str) -> Result<Click, SessionError> {
            match self.steps.pop_front() {
                Some(Step::Click(c)) => Ok(c),
                other => panic!("unexpected click, script step was {other:?}"),
            }
        }

        async fn wait_for(
            &mut self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<ContentWait, SessionError> {
            match self.steps.pop_front() {
                Some(Step::Wait(w)) => Ok(w),
                other => panic!("unexpected wait_for, script step was {other:?}"),
            }
        }

        async fn page_html(&mut self) -> Result<String, SessionError> {
            Ok(self.current_html.clone())
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            self.closed = true;
            Ok(())
        }
    }

    fn make_test_config(out_dir: &Path) -> Config {
        Config {
            catalog_url: "http://localhost:8080/catalog/".to_string(),
            sections: vec![Section::Laptops],
            format: OutputFormat::Csv,
            out_dir: out_dir.to_path_buf(),
            settle_ms: 0,
            content_wait_ms: 0,
            nav_timeout_ms: 1000,
            chrome_path: None,
            headless: true,
            skip_malformed: false,
        }
    }

    fn card_html(title: &str, price: &str) -> String {
        format!(
            r#"<div class="card-body">
                <a class="title" title="{title}" href="/p/1">...</a>
                <p class="description">desc</p>
                <h4 class="price">{price}</h4>
                <span class="ws-icon-star"></span>
                <p class="review-count">5 reviews</p>
            </div>"#
        )
    }

    fn page_of(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.concat())
    }

    #[tokio::test]
    async fn test_crawl_section_after_one_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_of(&[
            card_html("Laptop A", "$100.00"),
            card_html("Laptop B", "$200.00"),
            card_html("Laptop C", "$300.00"),
        ]);
        let mut session = MockSession::new(
            vec![
                Step::Probe(Probe::Found),
                Step::Click(Click::Clicked),
                Step::Wait(ContentWait::Appeared),
                Step::Probe(Probe::NotFound),
            ],
            vec![page],
        );

        let cmd = CrawlCommand::new(make_test_config(dir.path()));
        let summary = cmd.execute_with_session(&mut session).await.expect("crawl failed");

        assert_eq!(session.navigated, vec!["http://localhost:8080/catalog/computers/laptops"]);
        assert!(summary.contains("laptops: 3 records, 1 cycles (trigger missing)"));
        assert!(summary.contains("Total: 3 records across 1 sections"));

        let contents = std::fs::read_to_string(dir.path().join("laptops.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "title,description,price,rating,review_count");
        assert_eq!(lines[1], "Laptop A,desc,100,1,5");

        // The caller owns teardown, not the crawl loop.
        assert!(!session.closed);
    }

    #[tokio::test]
    async fn test_crawl_blocked_trigger_keeps_initial_render() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_of(&[card_html("Only A", "$10.00"), card_html("Only B", "$20.00")]);
        let mut session = MockSession::new(
            vec![Step::Probe(Probe::Found), Step::Click(Click::Blocked)],
            vec![page],
        );

        let cmd = CrawlCommand::new(make_test_config(dir.path()));
        let summary = cmd.execute_with_session(&mut session).await.expect("crawl failed");

        assert!(summary.contains("laptops: 2 records, 0 cycles (trigger blocked)"));
        assert!(dir.path().join("laptops.csv").exists());
    }

    #[tokio::test]
    async fn test_crawl_defaults_to_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let mut steps = Vec::new();
        let mut htmls = Vec::new();
        for i in 0..Section::all().len() {
            steps.push(Step::Probe(Probe::NotFound));
            htmls.push(page_of(&[card_html(&format!("Item {i}"), "$1.00")]));
        }
        let mut session = MockSession::new(steps, htmls);

        let mut config = make_test_config(dir.path());
        config.sections = Vec::new();
        let cmd = CrawlCommand::new(config);
        let summary = cmd.execute_with_session(&mut session).await.expect("crawl failed");

        assert!(summary.contains("Total: 6 records across 6 sections"));
        for section in Section::all() {
            assert!(
                dir.path().join(format!("{section}.csv")).exists(),
                "missing file for {section}"
            );
        }
        // Crawl order follows the catalog layout
        assert_eq!(session.navigated[0], "http://localhost:8080/catalog/");
        assert_eq!(session.navigated[5], "http://localhost:8080/catalog/phones/touch");
    }

    #[tokio::test]
    async fn test_crawl_fatal_error_keeps_finished_sections() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = MockSession::new(
            vec![Step::Probe(Probe::NotFound)],
            vec![page_of(&[card_html("Laptop A", "$100.00")])],
        );
        session.fail_navigation_at = Some(1);

        let mut config = make_test_config(dir.path());
        config.sections = vec![Section::Laptops, Section::Phones];
        let cmd = CrawlCommand::new(config);

        let err = cmd.execute_with_session(&mut session).await.expect_err("should fail");
        assert!(err.to_string().contains("phones"));

        assert!(dir.path().join("laptops.csv").exists());
        assert!(!dir.path().join("phones.csv").exists());
    }

    #[tokio::test]
    async fn test_crawl_strict_extraction_aborts_section() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_of(&[card_html("Good", "$1.00"), card_html("Bad", "free")]);
        let mut session =
            MockSession::new(vec![Step::Probe(Probe::NotFound)], vec![page]);

        let cmd = CrawlCommand::new(make_test_config(dir.path()));
        let err = cmd.execute_with_session(&mut session).await.expect_err("should fail");

        assert!(err.to_string().contains("laptops"));
        assert!(!dir.path().join("laptops.csv").exists());
    }

    #[tokio::test]
    async fn test_crawl_skip_malformed_writes_remaining_records() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_of(&[card_html("Good", "$1.00"), card_html("Bad", "free")]);
        let mut session =
            MockSession::new(vec![Step::Probe(Probe::NotFound)], vec![page]);

        let mut config = make_test_config(dir.path());
        config.skip_malformed = true;
        let cmd = CrawlCommand::new(config);
        let summary = cmd.execute_with_session(&mut session).await.expect("crawl failed");

        assert!(summary.contains("laptops: 1 records"));
        let contents = std::fs::read_to_string(dir.path().join("laptops.csv")).unwrap();
        assert!(contents.contains("Good"));
        assert!(!contents.contains("Bad"));
    }
}

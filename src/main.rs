//! catalog-crawler - Infinite-scroll product catalog scraper
//!
//! Drives headless Chrome through "load more" pagination and exports
//! product records per catalog section.

use anyhow::Result;
use catalog_crawler::catalog::sections::Section;
use catalog_crawler::commands::CrawlCommand;
use catalog_crawler::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "catalog-crawler",
    version,
    about = "Infinite-scroll product catalog scraper",
    long_about = "Drives a headless Chrome session through \"load more\" pagination on an e-commerce catalog and exports the product records of each section to a file."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog base URL
    #[arg(short, long, global = true, env = "CATALOG_URL")]
    url: Option<String>,

    /// Chrome binary path
    #[arg(long, global = true, env = "CATALOG_CHROME")]
    chrome: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "csv", global = true)]
    format: OutputFormat,

    /// Directory for section output files
    #[arg(short, long, global = true, env = "CATALOG_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl catalog sections and export their records
    #[command(alias = "c")]
    Crawl {
        /// Sections to crawl (comma-separated; default: all)
        #[arg(short, long, value_delimiter = ',')]
        sections: Option<Vec<Section>>,

        /// Settle delay before each trigger probe, in milliseconds
        #[arg(long)]
        settle: Option<u64>,

        /// How long to wait for new content after a click, in milliseconds
        #[arg(long)]
        content_wait: Option<u64>,

        /// Run the browser with a visible window
        #[arg(long)]
        no_headless: bool,

        /// Drop malformed listing cards instead of failing the section
        #[arg(long)]
        skip_malformed: bool,
    },

    /// List catalog sections
    Sections,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;

    if let Some(url) = cli.url {
        config.catalog_url = url;
    }
    if let Some(chrome) = cli.chrome {
        config.chrome_path = Some(chrome);
    }
    if let Some(out_dir) = cli.out_dir {
        config.out_dir = out_dir;
    }

    match cli.command {
        Commands::Crawl { sections, settle, content_wait, no_headless, skip_malformed } => {
            if let Some(sections) = sections {
                config.sections = sections;
            }
            if let Some(settle) = settle {
                config.settle_ms = settle;
            }
            if let Some(wait) = content_wait {
                config.content_wait_ms = wait;
            }
            if no_headless {
                config.headless = false;
            }
            if skip_malformed {
                config.skip_malformed = true;
            }

            let cmd = CrawlCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Sections => {
            println!("Catalog sections:\n");
            println!("{:<10} {:<14} {}", "Section", "File", "URL");
            println!("{:-<10} {:-<14} {:-<50}", "", "", "");

            for &section in Section::all() {
                println!(
                    "{:<10} {:<14} {}",
                    section.to_string(),
                    format!("{}.{}", section.file_stem(), config.format.extension()),
                    config.section_url(section)
                );
            }
        }
    }

    Ok(())
}

//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::catalog::sections::Section;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog base URL, ending at the listing root
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Sections to crawl (empty = all)
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Output file format
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory for section output files
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Settle delay before each trigger probe, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// How long to wait for new content after a click, in milliseconds
    #[serde(default = "default_content_wait_ms")]
    pub content_wait_ms: u64,

    /// Page navigation timeout, in milliseconds
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,

    /// Chrome binary path (autodetected when unset)
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Run the browser headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Drop malformed listing cards instead of failing the section
    #[serde(default)]
    pub skip_malformed: bool,
}

fn default_catalog_url() -> String {
    "https://webscraper.io/test-sites/e-commerce/more/".to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_content_wait_ms() -> u64 {
    2000
}

fn default_nav_timeout_ms() -> u64 {
    30000
}

fn default_headless() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            sections: Vec::new(),
            format: OutputFormat::Csv,
            out_dir: default_out_dir(),
            settle_ms: default_settle_ms(),
            content_wait_ms: default_content_wait_ms(),
            nav_timeout_ms: default_nav_timeout_ms(),
            chrome_path: None,
            headless: default_headless(),
            skip_malformed: false,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("catalog-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("CATALOG_URL") {
            self.catalog_url = url;
        }

        if let Ok(chrome) = std::env::var("CATALOG_CHROME") {
            self.chrome_path = Some(PathBuf::from(chrome));
        }

        if let Ok(dir) = std::env::var("CATALOG_OUT_DIR") {
            self.out_dir = PathBuf::from(dir);
        }

        self
    }

    /// Builds the full URL for one catalog section.
    pub fn section_url(&self, section: Section) -> String {
        let base = self.catalog_url.trim_end_matches('/');
        let path = section.path();
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Output format for section files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: csv, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

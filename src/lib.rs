//! catalog-crawler - Infinite-scroll product catalog scraper
//!
//! Drives a headless Chrome session through "load more" pagination on a
//! demo e-commerce catalog, then extracts product records from the fully
//! expanded pages and writes one output file per section.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod export;
pub mod session;

pub use catalog::models::Product;
pub use catalog::sections::Section;
pub use config::Config;

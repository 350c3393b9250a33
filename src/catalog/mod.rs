//! Catalog-specific modules for page loading, extraction, and data models.

pub mod extractor;
pub mod loader;
pub mod models;
pub mod sections;
pub mod selectors;

pub use extractor::{ExtractError, Extractor};
pub use loader::{ContentLoader, LoadEnd, PageSnapshot};
pub use models::Product;
pub use sections::Section;

//! Maps a fully expanded page snapshot into product records.

use crate::catalog::loader::PageSnapshot;
use crate::catalog::models::Product;
use crate::catalog::selectors::card;
use crate::config::Config;
use scraper::{ElementRef, Html};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// A card that does not hold a well-formed record.
///
/// Cards are identified by their zero-based position in document order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("card {index}: missing {field} element")]
    MissingElement { index: usize, field: &'static str },

    #[error("card {index}: title element has no {attr:?} attribute")]
    MissingAttribute { index: usize, attr: &'static str },

    #[error("card {index}: title attribute is empty")]
    EmptyTitle { index: usize },

    #[error("card {index}: cannot parse price from {text:?}")]
    MalformedPrice { index: usize, text: String },

    #[error("card {index}: cannot parse review count from {text:?}")]
    MalformedReviews { index: usize, text: String },
}

/// Extracts product records from snapshot markup.
pub struct Extractor {
    skip_malformed: bool,
}

impl Extractor {
    /// Creates an extractor. With `skip_malformed` set, bad cards are
    /// logged and dropped instead of failing the whole page.
    pub fn new(skip_malformed: bool) -> Self {
        Self { skip_malformed }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.skip_malformed)
    }

    /// Parses every listing card in the snapshot, in document order.
    pub fn extract(&self, snapshot: &PageSnapshot) -> Result<Vec<Product>, ExtractError> {
        let document = Html::parse_document(&snapshot.html);

        let mut products = Vec::new();
        for (index, element) in document.select(&card::ROOT).enumerate() {
            match self.parse_card(element, index) {
                Ok(product) => {
                    trace!(index, title = %product.title, "parsed card");
                    products.push(product);
                }
                Err(e) if self.skip_malformed => {
                    warn!(index, error = %e, "skipping malformed card");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(url = %snapshot.url, count = products.len(), "extracted records");
        Ok(products)
    }

    /// Parses a single listing card.
    fn parse_card(&self, element: ElementRef, index: usize) -> Result<Product, ExtractError> {
        // Title comes from the attribute; the element text is truncated.
        let title = element
            .select(&card::TITLE)
            .next()
            .ok_or(ExtractError::MissingElement {
                index,
                field: "title",
            })?
            .value()
            .attr(card::TITLE_ATTR)
            .ok_or(ExtractError::MissingAttribute {
                index,
                attr: card::TITLE_ATTR,
            })?
            .trim()
            .to_string();
        if title.is_empty() {
            return Err(ExtractError::EmptyTitle { index });
        }

        let description = element
            .select(&card::DESCRIPTION)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .ok_or(ExtractError::MissingElement {
                index,
                field: "description",
            })?;

        let price_text = element
            .select(&card::PRICE)
            .next()
            .map(|e| e.text().collect::<String>())
            .ok_or(ExtractError::MissingElement {
                index,
                field: "price",
            })?;
        let price = self.parse_price(&price_text, index)?;

        let rating = element.select(&card::STAR).count() as u8;

        let reviews_text = element
            .select(&card::REVIEW_COUNT)
            .next()
            .map(|e| e.text().collect::<String>())
            .ok_or(ExtractError::MissingElement {
                index,
                field: "review_count",
            })?;
        let review_count = self.parse_review_count(&reviews_text, index)?;

        Ok(Product {
            title,
            description,
            price,
            rating,
            review_count,
        })
    }

    /// Parses price text like "$1769.00". The currency prefix is required.
    fn parse_price(&self, text: &str, index: usize) -> Result<f64, ExtractError> {
        let trimmed = text.trim();
        let malformed = || ExtractError::MalformedPrice {
            index,
            text: trimmed.to_string(),
        };

        let value: f64 = trimmed
            .strip_prefix('$')
            .ok_or_else(|| malformed())?
            .trim()
            .parse()
            .map_err(|_| malformed())?;

        // parse::<f64> accepts "NaN" and "inf"; neither is a price.
        if !value.is_finite() || value < 0.0 {
            return Err(malformed());
        }
        Ok(value)
    }

    /// Parses review count text like "14 reviews": first token, base ten.
    fn parse_review_count(&self, text: &str, index: usize) -> Result<u32, ExtractError> {
        let malformed = || ExtractError::MalformedReviews {
            index,
            text: text.trim().to_string(),
        };

        text.split_whitespace()
            .next()
            .ok_or_else(|| malformed())?
            .parse()
            .map_err(|_| malformed())
    }
}

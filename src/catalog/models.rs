//! Data model for catalog listings.

use serde::{Deserialize, Serialize};

/// One catalog listing, fully derived from a single listing card.
///
/// Every field is required at extraction time: a card that cannot produce
/// all five fields is rejected as malformed rather than yielding a partial
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Listing title, from the card's title attribute. Never empty.
    pub title: String,
    /// Free-text description. May be empty.
    pub description: String,
    /// Price in catalog currency, non-negative.
    pub price: f64,
    /// Star rating, the count of star glyphs on the card (0-5).
    pub rating: u8,
    /// Number of reviews.
    pub review_count: u32,
}

impl Product {
    /// Column names for tabular output, in field order.
    pub const FIELDS: [&'static str; 5] =
        ["title", "description", "price", "rating", "review_count"];
}

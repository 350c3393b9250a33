//! CSS selectors for the catalog page shape.
//!
//! All selectors used against the rendered catalog live here. The loader
//! side passes the raw strings into the browser session (querySelector);
//! the extractor side uses the pre-parsed `scraper` selectors. Update this
//! file when the site changes its markup.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors the load-more loop drives the live page with.
pub mod page {
    /// The "load more" trigger element. The class name is misspelled on the
    /// site itself; keep it verbatim.
    pub const MORE_BUTTON: &str = ".ecomerce-items-scroll-more";

    /// A listing card, the unit the content wait looks for.
    pub const CARD: &str = ".card-body";
}

/// Selectors applied within a snapshot.
pub mod card {
    use super::*;

    /// Listing card container.
    pub static ROOT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(super::page::CARD).unwrap());

    /// Title element; the record title is its `title` attribute, not its
    /// (possibly truncated) text.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());

    /// Attribute on the title element holding the full title.
    pub const TITLE_ATTR: &str = "title";

    /// Free-text description.
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".description").unwrap());

    /// Price text, currency-prefixed ("$1769.00").
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price").unwrap());

    /// One star glyph; the rating is the count of these.
    pub static STAR: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".ws-icon-star").unwrap());

    /// Review count text ("14 reviews").
    pub static REVIEW_COUNT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".review-count").unwrap());
}

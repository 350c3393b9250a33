//! The fixed set of catalog sections the crawler visits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog sections of the target site, in crawl order.
///
/// Each section is one logical catalog page: a URL path under the catalog
/// root plus the stem of the output file its records are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    Computers,
    Laptops,
    Tablets,
    Phones,
    Touch,
}

impl Section {
    /// Returns the section's URL path relative to the catalog root.
    pub fn path(&self) -> &'static str {
        match self {
            Section::Home => "",
            Section::Computers => "computers/",
            Section::Laptops => "computers/laptops",
            Section::Tablets => "computers/tablets",
            Section::Phones => "phones/",
            Section::Touch => "phones/touch",
        }
    }

    /// Returns the stem of the output file for this section.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Computers => "computers",
            Section::Laptops => "laptops",
            Section::Tablets => "tablets",
            Section::Phones => "phones",
            Section::Touch => "touch",
        }
    }

    /// Returns all sections in crawl order.
    pub fn all() -> &'static [Section] {
        &[
            Section::Home,
            Section::Computers,
            Section::Laptops,
            Section::Tablets,
            Section::Phones,
            Section::Touch,
        ]
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

impl FromStr for Section {
    type Err = SectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(Section::Home),
            "computers" => Ok(Section::Computers),
            "laptops" => Ok(Section::Laptops),
            "tablets" => Ok(Section::Tablets),
            "phones" => Ok(Section::Phones),
            "touch" => Ok(Section::Touch),
            _ => Err(SectionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionParseError(String);

impl fmt::Display for SectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown section '{}'. Valid sections: home, computers, laptops, tablets, phones, touch",
            self.0
        )
    }
}

impl std::error::Error for SectionParseError {}

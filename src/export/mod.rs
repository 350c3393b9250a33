//! Writes extracted records to per-section output files (CSV, JSON).

use crate::catalog::{Product, Section};
use crate::config::{Config, OutputFormat};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Writes one output file per catalog section.
pub struct Exporter {
    format: OutputFormat,
    out_dir: PathBuf,
}

impl Exporter {
    /// Creates an exporter writing `format` files under `out_dir`.
    pub fn new(format: OutputFormat, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            out_dir: out_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.format, config.out_dir.clone())
    }

    /// Writes the section's records and returns the file path.
    ///
    /// An empty record set still produces a file, so a crawled section is
    /// always distinguishable from one that never ran.
    pub fn write_section(&self, section: Section, products: &[Product]) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("Failed to create output directory {}", self.out_dir.display())
        })?;

        let path = self
            .out_dir
            .join(format!("{}.{}", section.file_stem(), self.format.extension()));

        let contents = match self.format {
            OutputFormat::Csv => self.csv_contents(products),
            OutputFormat::Json => self.json_contents(products)?,
        };

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), count = products.len(), "wrote section file");
        Ok(path)
    }

    fn csv_contents(&self, products: &[Product]) -> String {
        let mut lines = Vec::with_capacity(products.len() + 1);
        lines.push(Product::FIELDS.join(","));

        for product in products {
            lines.push(format!(
                "{},{},{},{},{}",
                Self::csv_escape(&product.title),
                Self::csv_escape(&product.description),
                product.price,
                product.rating,
                product.review_count
            ));
        }

        lines.push(String::new()); // trailing newline
        lines.join("\n")
    }

    fn json_contents(&self, products: &[Product]) -> Result<String> {
        let mut contents =
            serde_json::to_string_pretty(products).context("Failed to serialize records")?;
        contents.push('\n');
        Ok(contents)
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(title: &str) -> Product {
        Product {
            title: title.to_string(),
            description: "A compact test unit".to_string(),
            price: 295.99,
            rating: 3,
            review_count: 14,
        }
    }

    #[test]
    fn test_write_csv_section() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(OutputFormat::Csv, dir.path());

        let products = vec![make_product("Alpha"), make_product("Beta")];
        let path = exporter.write_section(Section::Laptops, &products).unwrap();

        assert_eq!(path.file_name().unwrap(), "laptops.csv");
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "title,description,price,rating,review_count");
        assert_eq!(lines[1], "Alpha,A compact test unit,295.99,3,14");
        assert_eq!(lines[2], "Beta,A compact test unit,295.99,3,14");
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_write_empty_section_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(OutputFormat::Csv, dir.path());

        let path = exporter.write_section(Section::Touch, &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "title,description,price,rating,review_count\n");
    }

    #[test]
    fn test_csv_escaping_in_rows() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(OutputFormat::Csv, dir.path());

        let mut product = make_product("Laptop, 15\" display");
        product.description = "two\nlines".to_string();
        let path = exporter.write_section(Section::Home, &[product]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Laptop, 15\"\" display\""));
        assert!(contents.contains("\"two\nlines\""));
    }

    #[test]
    fn test_write_json_section() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(OutputFormat::Json, dir.path());

        let path = exporter.write_section(Section::Phones, &[make_product("Gamma")]).unwrap();

        assert_eq!(path.file_name().unwrap(), "phones.json");
        let contents = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Product> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Gamma");
    }

    #[test]
    fn test_write_json_empty_section() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(OutputFormat::Json, dir.path());

        let path = exporter.write_section(Section::Computers, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("run-1");
        let exporter = Exporter::new(OutputFormat::Csv, &nested);

        let path = exporter.write_section(Section::Tablets, &[]).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(Exporter::csv_escape("simple"), "simple");
        assert_eq!(Exporter::csv_escape("with,comma"), "\"with,comma\"");
        assert_eq!(Exporter::csv_escape("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(Exporter::csv_escape("with\nnewline"), "\"with\nnewline\"");
    }
}

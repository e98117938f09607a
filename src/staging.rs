//! Staging: flattening a nested JSON product feed into catalog records.
//!
//! Product feeds arrive as a JSON array of objects with a nested `rating`
//! object. Rollups only consume flat delimited records, so the feed is
//! staged to a CSV in [`Schema::catalog`] column order, with `rating.rate`
//! and `rating.count` hoisted to `rating_rate` and `rating_count`. Every
//! field is quoted on output; free-text titles and descriptions routinely
//! contain commas.
//!
//! [`Schema::catalog`]: crate::Schema::catalog
//!
//! ```
//! use tally::staging::parse_feed;
//!
//! let feed = r#"[{
//!     "id": 1, "title": "Mouse", "price": 25.0,
//!     "description": "Wireless mouse", "category": "electronics",
//!     "image": "https://example.com/1.png",
//!     "rating": { "rate": 4.5, "count": 120 }
//! }]"#;
//! let products = parse_feed(feed)?;
//! assert_eq!(products[0].rating.count, 120);
//! # anyhow::Ok(())
//! ```

use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Nested rating block of a product feed entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u64,
}

/// One product feed entry. Unknown feed fields are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
}

/// Flat catalog row; field order matches [`Schema::catalog`] columns.
///
/// [`Schema::catalog`]: crate::Schema::catalog
#[derive(Serialize)]
struct CatalogRow<'a> {
    id: u64,
    title: &'a str,
    price: f64,
    description: &'a str,
    category: &'a str,
    image: &'a str,
    rating_rate: f64,
    rating_count: u64,
}

impl Product {
    fn catalog_row(&self) -> CatalogRow<'_> {
        CatalogRow {
            id: self.id,
            title: &self.title,
            price: self.price,
            description: &self.description,
            category: &self.category,
            image: &self.image,
            rating_rate: self.rating.rate,
            rating_count: self.rating.count,
        }
    }
}

/// Parse a JSON product feed from a string.
///
/// # Errors
/// Returns an error if the JSON is not an array of products.
pub fn parse_feed(json: &str) -> Result<Vec<Product>> {
    serde_json::from_str(json).context("parse product feed JSON")
}

/// Read and parse a JSON product feed file.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_feed(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    serde_json::from_reader(rdr)
        .with_context(|| format!("parse product feed {}", path.display()))
}

/// Write products as a flat catalog CSV with a header row, every field
/// quoted.
///
/// # Returns
/// The number of rows written (i.e., `products.len()`).
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or any row fails to
/// serialize/flush.
pub fn write_catalog(path: impl AsRef<Path>, products: &[Product]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Always)
        .from_writer(w);
    for (i, product) in products.iter().enumerate() {
        wtr.serialize(product.catalog_row())
            .with_context(|| format!("serialize catalog row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(products.len())
}

/// Stage one feed file: read the JSON array, write the catalog CSV.
///
/// # Returns
/// The number of products staged.
///
/// # Errors
/// Returns an error if the feed cannot be read or the catalog cannot be
/// written.
pub fn stage_feed(feed: impl AsRef<Path>, catalog: impl AsRef<Path>) -> Result<usize> {
    let products = read_feed(feed)?;
    write_catalog(catalog, &products)
}

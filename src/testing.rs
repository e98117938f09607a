//! Testing utilities for rollup pipelines.
//!
//! This module provides the pieces tests reach for most often:
//!
//! - **Fixtures**: sample batches with known statistics, including every
//!   rejection reason
//! - **File helpers**: write line files (optionally gzipped) and materialize
//!   a multi-file batch in a temp directory
//! - **Assertions**: compare finished statistics rows with tolerance for
//!   float representation
//!
//! # Quick Start
//!
//! ```
//! use tally::testing::{assert_stats_row, sample_sales_lines};
//! use tally::{ExecMode, Rollup, Schema};
//!
//! let rollup = Rollup::new(Schema::sales())?.with_mode(ExecMode::Sequential);
//! let out = rollup.run_lines(&sample_sales_lines());
//! assert_stats_row(&out.rows, "electronics", 2, &[612.75, 3.0, 2426.0]);
//! # anyhow::Ok(())
//! ```

use crate::aggregate::CategoryStats;
use anyhow::{Context, Result};
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A messy sales batch exercising every rejection reason.
///
/// Contains 11 lines: 5 good records, 3 header-or-blank lines (leading
/// header, a blank, a repeated header), one unterminated quote, one short
/// row, and one non-numeric price. The good records reduce to:
///
/// | category    | count | avg_price | total_quantity | total_revenue |
/// |-------------|-------|-----------|----------------|---------------|
/// | electronics | 2     | 612.75    | 3              | 2426.00       |
/// | furniture   | 2     | 210.13    | 5              | 781.00        |
/// | office      | 1     | 7.75      | 2              | 15.50         |
#[must_use]
pub fn sample_sales_lines() -> Vec<String> {
    [
        "id,name,category,price,quantity,date",
        "1,Laptop,electronics,1200.50,2,2024-01-15",
        r#"2,"Mouse, wireless",electronics,25.00,1,2024-01-16"#,
        "3,Desk,furniture,300.00,1,2024-01-17",
        "",
        "id,name,category,price,quantity,date",
        "4,Chair,furniture,120.25,4,2024-01-18",
        r#"5,"Unterminated,furniture,10.00,1,2024-01-19"#,
        "6,Pen,office,2.50",
        "7,Notebook,office,abc,3,2024-01-20",
        "8,Stapler,office,7.75,2,2024-01-21",
    ]
    .map(String::from)
    .to_vec()
}

/// A small JSON product feed for staging tests.
///
/// Four products in two categories; under [`Schema::catalog`] they reduce
/// to `electronics: count 2, avg_price 25.00, avg_rating 4.00,
/// total_reviews 300` and `clothing: count 2, avg_price 35.00, avg_rating
/// 4.40, total_reviews 100`.
///
/// [`Schema::catalog`]: crate::Schema::catalog
#[must_use]
pub fn sample_feed_json() -> String {
    r#"[
  {
    "id": 1,
    "title": "USB-C Hub",
    "price": 34.99,
    "description": "Seven port hub",
    "category": "electronics",
    "image": "https://example.com/img/1.png",
    "rating": { "rate": 4.1, "count": 220 }
  },
  {
    "id": 2,
    "title": "Cable, braided",
    "price": 15.01,
    "description": "Two meter charging cable",
    "category": "electronics",
    "image": "https://example.com/img/2.png",
    "rating": { "rate": 3.9, "count": 80 }
  },
  {
    "id": 3,
    "title": "Denim Jacket",
    "price": 49.50,
    "description": "Classic fit",
    "category": "clothing",
    "image": "https://example.com/img/3.png",
    "rating": { "rate": 4.5, "count": 55 }
  },
  {
    "id": 4,
    "title": "Wool Scarf",
    "price": 20.50,
    "description": "Hand woven",
    "category": "clothing",
    "image": "https://example.com/img/4.png",
    "rating": { "rate": 4.3, "count": 45 }
  }
]"#
    .to_string()
}

/// Write lines to a text file, one per line, creating parent directories.
///
/// # Errors
/// Returns an error if the file or directories cannot be created or
/// written.
pub fn write_lines<P, S>(path: P, lines: &[S]) -> Result<()>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    for line in lines {
        writeln!(f, "{}", line.as_ref())?;
    }
    Ok(())
}

/// Write lines to a gzip-compressed text file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
#[cfg(feature = "compression-gzip")]
#[cfg_attr(docsrs, doc(cfg(feature = "compression-gzip")))]
pub fn write_gzip_lines<P, S>(path: P, lines: &[S]) -> Result<()>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut enc = GzEncoder::new(f, Compression::default());
    for line in lines {
        writeln!(enc, "{}", line.as_ref())?;
    }
    enc.finish()
        .with_context(|| format!("finish gzip stream {}", path.display()))?;
    Ok(())
}

/// Materialize [`sample_sales_lines`] as a two-file batch in a fresh temp
/// directory. Each file carries its own header row; the combined statistics
/// match the single-file fixture.
///
/// The returned [`TempDir`] must be kept alive for as long as the files are
/// used.
///
/// # Errors
/// Returns an error if the directory or files cannot be created.
pub fn sample_sales_batch() -> Result<(TempDir, Vec<PathBuf>)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let lines = sample_sales_lines();
    let (first, rest) = lines.split_at(7);

    let a = dir.path().join("sales_2024-01-a.csv");
    let b = dir.path().join("sales_2024-01-b.csv");
    write_lines(&a, first)?;
    let mut tail = vec![lines[0].clone()];
    tail.extend(rest.iter().cloned());
    write_lines(&b, &tail)?;
    Ok((dir, vec![a, b]))
}

/// Assert that `rows` contains a row for `category` with the expected count
/// and statistics. Statistics compare within `1e-9` to absorb float
/// representation noise; values themselves are already rounded.
///
/// # Panics
/// Panics with a descriptive message if the row is missing or any value
/// differs.
pub fn assert_stats_row(rows: &[CategoryStats], category: &str, count: u64, stats: &[f64]) {
    let row = rows
        .iter()
        .find(|r| r.category == category)
        .unwrap_or_else(|| {
            panic!(
                "no statistics row for category '{category}':\n  Present: {:?}",
                rows.iter().map(|r| r.category.as_str()).collect::<Vec<_>>()
            )
        });
    assert_eq!(
        row.count, count,
        "count mismatch for '{category}':\n  Expected: {count}\n  Actual: {}",
        row.count
    );
    assert_eq!(
        row.stats.len(),
        stats.len(),
        "stat width mismatch for '{category}':\n  Expected: {}\n  Actual: {}",
        stats.len(),
        row.stats.len()
    );
    for (i, (actual, expected)) in row.stats.iter().zip(stats).enumerate() {
        assert!(
            (actual - expected).abs() < 1e-9,
            "stat #{i} mismatch for '{category}':\n  Expected: {expected}\n  Actual: {actual}"
        );
    }
}

//! End-to-end product catalog analysis.
//!
//! Demonstrates:
//! - Staging a nested JSON product feed into flat catalog records
//! - Rolling the catalog up into per-category statistics in parallel
//! - Writing the statistics CSV and reading it back through the store
//! - Cross-category summaries and run metrics
//!
//! Run with: cargo run --example product_analysis

use anyhow::Result;
use tally::staging::{parse_feed, write_catalog};
use tally::store::ResultStore;
use tally::{ExecMode, Rollup, Schema, write_stats};

/// A miniature product feed, shaped like the public storefront APIs that
/// feed real catalog batches.
const FEED: &str = r#"[
  {
    "id": 1,
    "title": "USB-C Hub",
    "price": 34.99,
    "description": "Seven port hub with passthrough charging",
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
    "description": "Classic fit, brushed lining",
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
  },
  {
    "id": 5,
    "title": "Silver Bracelet",
    "price": 168.00,
    "description": "Sterling silver chain",
    "category": "jewelery",
    "image": "https://example.com/img/5.png",
    "rating": { "rate": 4.6, "count": 400 }
  },
  {
    "id": 6,
    "title": "Plated Ring",
    "price": 10.99,
    "description": "Gold plated",
    "category": "jewelery",
    "image": "https://example.com/img/6.png",
    "rating": { "rate": 2.1, "count": 100 }
  }
]"#;

fn main() -> Result<()> {
    println!("📦 Product Catalog Analysis\n");

    let dir = tempfile::tempdir()?;
    let catalog_path = dir.path().join("catalog.csv");
    let stats_path = dir.path().join("catalog_stats.csv");

    // =========================================================================
    // STAGE: nested feed JSON -> flat catalog records
    // =========================================================================
    let products = parse_feed(FEED)?;
    let staged = write_catalog(&catalog_path, &products)?;
    println!("Staged {staged} products -> {}", catalog_path.display());

    // =========================================================================
    // ROLL UP: per-category count / avg_price / avg_rating / total_reviews
    // =========================================================================
    let rollup = Rollup::new(Schema::catalog())?.with_mode(ExecMode::Parallel {
        threads: Some(4),
        partitions: Some(8),
    });
    let out = rollup.run_files([&catalog_path])?;
    write_stats(&stats_path, rollup.schema(), &out.rows)?;

    println!("\nPer-category statistics:");
    for row in &out.rows {
        println!(
            "  {:<12} count={} avg_price={:.2} avg_rating={:.2} reviews={}",
            row.category, row.count, row.stats[0], row.stats[1], row.stats[2] as i64
        );
    }
    out.metrics.print();

    // =========================================================================
    // READ BACK: load the finished statistics through the store
    // =========================================================================
    let store = ResultStore::load(&stats_path)?;
    println!("Lookup is case-insensitive:");
    if let Some(row) = store.get("ELECTRONICS") {
        println!("  ELECTRONICS -> {} records", row.count);
    }

    if let Some(summary) = store.summary("total_reviews") {
        println!("\nAcross all {} categories:", summary.categories);
        println!("  records: {}", summary.records);
        for (column, value) in &summary.stats {
            println!("  {column}: {value:.2}");
        }
        if let Some(top) = summary.top {
            println!(
                "  most reviewed: {} ({} reviews)",
                top.category, top.value as i64
            );
        }
    }

    Ok(())
}

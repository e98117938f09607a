//! Read-only access to previously written statistics files.
//!
//! A [`ResultStore`] loads one statistics CSV (the output of a finished
//! run) and serves lookups without ever mutating the file. Two behaviors
//! matter to callers:
//!
//! - **Missing is not empty.** [`ResultStore::try_load`] returns `Ok(None)`
//!   when the file does not exist, and `Ok(Some(store))` with zero rows for
//!   a file that exists but holds no data rows. Consumers can tell "no run
//!   has happened" apart from "a run produced nothing".
//! - **Category lookup is case-insensitive.** `get("Electronics")` finds an
//!   `electronics` row. When two rows differ only by case, the first one in
//!   file order wins; [`ResultStore::rows`] still exposes both.
//!
//! ```
//! use tally::store::ResultStore;
//!
//! let csv = "\
//! category,count,avg_price,total_quantity,total_revenue
//! electronics,2,15.00,3,40.00
//! office,1,2.50,4,10.00
//! ";
//! let store = ResultStore::from_reader(csv.as_bytes())?;
//! assert_eq!(store.get("ELECTRONICS").unwrap().count, 2);
//!
//! let summary = store.summary("total_revenue").unwrap();
//! assert_eq!(summary.records, 3);
//! assert_eq!(summary.top.unwrap().category, "electronics");
//! # anyhow::Ok(())
//! ```

use crate::aggregate::round2;
use crate::io::compression::auto_detect_reader;
use anyhow::{Context, Result, bail};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// One row of a loaded statistics file.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreRow {
    pub category: String,
    pub count: u64,
    /// Statistic values aligned with [`ResultStore::columns`].
    pub values: Vec<f64>,
}

/// Cross-category rollup of a whole statistics file.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Number of category rows.
    pub categories: usize,
    /// Sum of all row counts.
    pub records: u64,
    /// One value per stat column, in file order: `avg_*` columns carry the
    /// mean of the per-category values, all others the grand total.
    pub stats: Vec<(String, f64)>,
    /// Row with the largest value in the requested column; `None` when the
    /// column does not exist.
    pub top: Option<TopCategory>,
}

/// The category leading one statistic.
#[derive(Clone, Debug, PartialEq)]
pub struct TopCategory {
    pub category: String,
    pub value: f64,
}

/// An immutable, indexed view of one statistics CSV.
#[derive(Clone, Debug)]
pub struct ResultStore {
    columns: Vec<String>,
    rows: Vec<StoreRow>,
    /// Lowercased category name to row position, first occurrence wins.
    index: HashMap<String, usize>,
}

impl ResultStore {
    /// Load a statistics file.
    ///
    /// # Errors
    /// Returns an error if the file is missing, unreadable, or not a
    /// statistics CSV.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let rdr = auto_detect_reader(f, path)
            .with_context(|| format!("setup decompression for {}", path.display()))?;
        Self::from_reader(rdr).with_context(|| format!("invalid statistics file {}", path.display()))
    }

    /// Load a statistics file that may not have been written yet.
    ///
    /// Returns `Ok(None)` when the file does not exist. Every other failure
    /// is still an error; only absence is expected.
    ///
    /// # Errors
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(f) => {
                let rdr = auto_detect_reader(f, path)
                    .with_context(|| format!("setup decompression for {}", path.display()))?;
                let store = Self::from_reader(rdr)
                    .with_context(|| format!("invalid statistics file {}", path.display()))?;
                Ok(Some(store))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("open {}", path.display())),
        }
    }

    /// Parse a statistics CSV from any reader.
    ///
    /// The header must start with `category,count`; everything after those
    /// two names the stat columns.
    ///
    /// # Errors
    /// Returns an error on a malformed header, a ragged row, or a count or
    /// statistic that does not parse.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        // Flexible so ragged rows reach our own arity check below.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers().context("read statistics header")?.clone();
        let mut leading = headers.iter();
        if leading.next() != Some("category") || leading.next() != Some("count") {
            bail!("header must start with 'category,count'");
        }
        let columns: Vec<String> = headers.iter().skip(2).map(String::from).collect();

        let mut rows = Vec::new();
        let mut index = HashMap::new();
        for (i, rec) in rdr.records().enumerate() {
            let rec = rec.with_context(|| format!("parse statistics row #{}", i + 1))?;
            if rec.len() != columns.len() + 2 {
                bail!(
                    "statistics row #{} has {} fields, expected {}",
                    i + 1,
                    rec.len(),
                    columns.len() + 2
                );
            }
            let category = rec[0].to_string();
            let count: u64 = rec[1]
                .trim()
                .parse()
                .with_context(|| format!("row #{}: bad count '{}'", i + 1, &rec[1]))?;
            let values = rec
                .iter()
                .skip(2)
                .map(parse_stat)
                .collect::<Result<Vec<f64>>>()
                .with_context(|| format!("statistics row #{}", i + 1))?;
            index.entry(category.to_lowercase()).or_insert(rows.len());
            rows.push(StoreRow {
                category,
                count,
                values,
            });
        }
        Ok(Self {
            columns,
            rows,
            index,
        })
    }

    /// Stat column names, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, in file order.
    #[must_use]
    pub fn rows(&self) -> &[StoreRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up one category, ignoring case.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&StoreRow> {
        self.index
            .get(&category.to_lowercase())
            .map(|&i| &self.rows[i])
    }

    /// One statistic for one category, by exact column name.
    #[must_use]
    pub fn value(&self, category: &str, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.get(category).and_then(|row| row.values.get(idx).copied())
    }

    /// Summarize the whole store, ranking categories by `top_by`.
    ///
    /// Returns `None` for an empty store; there is nothing meaningful to
    /// summarize. Ties in the ranking column go to the earliest row.
    #[must_use]
    pub fn summary(&self, top_by: &str) -> Option<Summary> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len();
        let stats = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let sum: f64 = self.rows.iter().map(|r| r.values[i]).sum();
                let value = if col.starts_with("avg_") {
                    round2(sum / n as f64)
                } else {
                    round2(sum)
                };
                (col.clone(), value)
            })
            .collect();
        let top = self
            .columns
            .iter()
            .position(|c| c == top_by)
            .and_then(|idx| {
                self.rows
                    .iter()
                    .enumerate()
                    .max_by_key(|(i, row)| (OrderedFloat(row.values[idx]), Reverse(*i)))
                    .map(|(_, row)| TopCategory {
                        category: row.category.clone(),
                        value: row.values[idx],
                    })
            });
        Some(Summary {
            categories: n,
            records: self.rows.iter().map(|r| r.count).sum(),
            stats,
            top,
        })
    }
}

/// Statistics values must be finite numbers; anything else means the file
/// was not produced by a rollup run.
fn parse_stat(field: &str) -> Result<f64> {
    let v: f64 = field
        .trim()
        .parse()
        .with_context(|| format!("bad statistic '{field}'"))?;
    if !v.is_finite() {
        bail!("non-finite statistic '{field}'");
    }
    Ok(v)
}

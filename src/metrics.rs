//! Run statistics: line, record, and rejection counters.
//!
//! Every run tracks how many lines it saw, how many became measurements,
//! and how many were rejected per [`Reject`] reason. Counters are plain
//! values, folded per partition and merged like the aggregates themselves,
//! so parallel runs report the same totals as sequential ones. Metrics can
//! be printed to stdout or saved to a JSON file.
//!
//! ```
//! use tally::metrics::RunMetrics;
//! use tally::Reject;
//!
//! let mut a = RunMetrics::new();
//! a.record_line();
//! a.record_accept();
//!
//! let mut b = RunMetrics::new();
//! b.record_line();
//! b.record_reject(&Reject::HeaderOrBlank);
//!
//! a.merge(b);
//! assert_eq!(a.lines, 2);
//! assert_eq!(a.records, 1);
//! assert_eq!(a.reject_count("header-or-blank"), 1);
//! ```

use crate::parse::Reject;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Counters for one run, or one partition of a run before merging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Lines offered to the parser.
    pub lines: u64,
    /// Lines that survived parsing and extraction.
    pub records: u64,
    /// Rejection counts keyed by reason label.
    pub rejects: BTreeMap<&'static str, u64>,
}

impl RunMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&mut self) {
        self.lines += 1;
    }

    pub fn record_accept(&mut self) {
        self.records += 1;
    }

    pub fn record_reject(&mut self, reject: &Reject) {
        *self.rejects.entry(reject.label()).or_insert(0) += 1;
    }

    /// Total rejected lines across all reasons.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejects.values().sum()
    }

    /// Rejection count for one reason label, zero if never seen.
    #[must_use]
    pub fn reject_count(&self, label: &str) -> u64 {
        self.rejects.get(label).copied().unwrap_or(0)
    }

    /// Merge another partition's counters into this one.
    pub fn merge(&mut self, other: RunMetrics) {
        self.lines += other.lines;
        self.records += other.records;
        for (label, n) in other.rejects {
            *self.rejects.entry(label).or_insert(0) += n;
        }
    }

    /// All counters as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "lines": self.lines,
            "records": self.records,
            "rejected": self.rejected(),
            "rejects": self.rejects,
        })
    }

    /// Print the counters to stdout in a human-readable format.
    pub fn print(&self) {
        println!("\n========== Run Metrics ==========");
        println!("Lines Read: {}", self.lines);
        println!("Records Aggregated: {}", self.records);
        println!("Lines Rejected: {}", self.rejected());
        for (label, n) in &self.rejects {
            println!("  {label}: {n}");
        }
        println!("=================================\n");
    }

    /// Save the counters to a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file =
            File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

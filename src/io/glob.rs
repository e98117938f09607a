//! Glob expansion for batch runs over file sets.
//!
//! Record batches usually arrive as families of files, one per day or per
//! exporting shard (`data/sales_*.csv`, `drops/2024-*/catalog.csv.gz`).
//! These helpers expand such patterns into a sorted file list so a run
//! visits the same files in the same order every time.
//!
//! ```no_run
//! use tally::io::glob::expand_glob;
//!
//! let files = expand_glob("data/sales_*.csv")?;
//! # anyhow::Ok(())
//! ```

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted list of matching files.
///
/// Directories matching the pattern are skipped; only plain files are
/// returned. Results are sorted lexicographically so batch runs are
/// deterministic regardless of filesystem enumeration order. Zero matches
/// is not an error here; use [`expand_glob_required`] when at least one
/// file must exist.
///
/// # Errors
/// Returns an error if the pattern is invalid or a matched path cannot be
/// read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob(pattern).with_context(|| format!("invalid glob pattern '{pattern}'"))? {
        let path = entry.with_context(|| format!("walk matches of '{pattern}'"))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
/// Returns an error if the pattern is invalid, a matched path cannot be
/// read, or nothing matches.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found for '{pattern}'");
    }
    Ok(files)
}

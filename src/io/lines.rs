//! Raw line ingestion.
//!
//! Rollup inputs are plain text files of delimited records, optionally
//! gzip-compressed. [`read_lines`] loads one file into memory as lines so
//! the driver can partition them freely; record validation happens later,
//! in the parser, never here.

use crate::io::compression::auto_detect_reader;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read every line of a text file, transparently decompressing when the
/// path or content looks compressed. Line terminators (`\n` or `\r\n`) are
/// stripped.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    BufReader::new(rdr)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("read {}", path.display()))
}

//! The rollup driver: splitting, folding, merging, and finishing runs.
//!
//! A run has four phases. Input lines are split into contiguous partitions,
//! each partition is folded independently into per-category
//! [`PartialAggregate`]s, the per-partition maps are merged, and the merged
//! aggregates are finished into sorted [`CategoryStats`] rows. Because the
//! aggregates merge associatively and commutatively, the partition count,
//! chunk boundaries, and thread scheduling never change the result:
//! [`ExecMode::Sequential`] and [`ExecMode::Parallel`] produce identical
//! output for the same input.
//!
//! ```
//! use tally::{ExecMode, Rollup, Schema};
//!
//! let rollup = Rollup::new(Schema::sales())?.with_mode(ExecMode::Sequential);
//! let out = rollup.run_lines(&[
//!     "id,name,category,price,quantity,date",
//!     "1,Pen,office,2.50,4,2024-03-01",
//!     "2,Desk,office,120.00,1,2024-03-01",
//! ]);
//! let office = out.get("office").unwrap();
//! assert_eq!(office.count, 2);
//! assert_eq!(office.stats, vec![61.25, 5.0, 130.0]);
//! # anyhow::Ok(())
//! ```

use crate::aggregate::{CategoryStats, PartialAggregate};
use crate::extract::Extractor;
use crate::io::glob::expand_glob_required;
use crate::io::lines::read_lines;
#[cfg(feature = "metrics")]
use crate::metrics::RunMetrics;
use crate::parse::LineParser;
use crate::schema::Schema;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// How a run distributes work.
#[derive(Clone, Copy, Debug)]
pub enum ExecMode {
    /// Fold everything on the calling thread, one partition.
    Sequential,
    /// Fold partitions on a rayon pool.
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Parallel {
            threads: None,
            partitions: None,
        }
    }
}

/// Everything a finished run produces: sorted statistics rows, plus run
/// counters when the `metrics` feature is enabled.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// One row per category, sorted by category name.
    pub rows: Vec<CategoryStats>,
    #[cfg(feature = "metrics")]
    pub metrics: RunMetrics,
}

impl RunOutput {
    /// The row for one category, if it appeared in the input.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategoryStats> {
        self.rows.iter().find(|r| r.category == category)
    }
}

/// Per-partition fold state: aggregates keyed by category, plus that
/// partition's counters.
#[derive(Default)]
struct PartitionFold {
    aggregates: HashMap<String, PartialAggregate>,
    #[cfg(feature = "metrics")]
    metrics: RunMetrics,
}

/// A configured rollup over one schema.
///
/// Construction validates the schema and resolves all column lookups, so
/// the per-line hot path is index arithmetic only.
pub struct Rollup {
    schema: Schema,
    extractor: Extractor,
    pub mode: ExecMode,
    pub default_partitions: usize,
}

impl Rollup {
    /// Build a rollup for `schema`.
    ///
    /// # Errors
    /// Returns an error if the schema fails [`Schema::validate`].
    pub fn new(schema: Schema) -> Result<Self> {
        schema.validate()?;
        let extractor = Extractor::new(&schema)?;
        Ok(Self {
            schema,
            extractor,
            mode: ExecMode::default(),
            default_partitions: 2 * num_cpus::get().max(2),
        })
    }

    /// Replace the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run over in-memory lines, partitioning per the execution mode.
    pub fn run_lines<S>(&self, lines: &[S]) -> RunOutput
    where
        S: AsRef<str> + Sync,
    {
        match self.mode {
            ExecMode::Sequential => self.finish(self.fold_partition(lines)),
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                if let Some(t) = threads {
                    // ok() to ignore "already built" on repeated calls in tests
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(t)
                        .build_global()
                        .ok();
                }
                let parts = partitions.unwrap_or(self.default_partitions);
                let folds: Vec<PartitionFold> = split_lines(lines, parts)
                    .into_par_iter()
                    .map(|chunk| self.fold_partition(chunk))
                    .collect();
                self.finish(merge_folds(folds))
            }
        }
    }

    /// Run over explicit partitions, taking the boundaries as given.
    ///
    /// Folding happens partition by partition on the calling thread; this
    /// entry point exists to replay a specific partitioning, so it does not
    /// re-split or parallelize.
    pub fn run_partitions<S>(&self, partitions: &[Vec<S>]) -> RunOutput
    where
        S: AsRef<str>,
    {
        let folds = partitions
            .iter()
            .map(|p| self.fold_partition(p))
            .collect();
        self.finish(merge_folds(folds))
    }

    /// Run over any line-oriented reader.
    ///
    /// # Errors
    /// Returns an error if the stream cannot be read.
    pub fn run_reader<R: Read>(&self, reader: R) -> Result<RunOutput> {
        let lines = BufReader::new(reader)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("read input stream")?;
        Ok(self.run_lines(&lines))
    }

    /// Run over a set of files, concatenated in the order given.
    ///
    /// Each file may carry its own header row; headers are rejected
    /// per-line, not per-file, so concatenation is safe.
    ///
    /// # Errors
    /// Returns an error if any file cannot be opened or read.
    pub fn run_files<I, P>(&self, paths: I) -> Result<RunOutput>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut lines = Vec::new();
        for path in paths {
            lines.extend(read_lines(path)?);
        }
        Ok(self.run_lines(&lines))
    }

    /// Run over every file matching a glob pattern, in sorted path order.
    ///
    /// # Errors
    /// Returns an error if the pattern is invalid, matches no files, or any
    /// matched file cannot be read.
    pub fn run_glob(&self, pattern: &str) -> Result<RunOutput> {
        let files = expand_glob_required(pattern)?;
        self.run_files(files)
    }

    /// Fold one partition of lines into per-category aggregates.
    fn fold_partition<S: AsRef<str>>(&self, lines: &[S]) -> PartitionFold {
        let mut parser = LineParser::new(&self.schema);
        let mut fold = PartitionFold::default();

        for line in lines {
            #[cfg(feature = "metrics")]
            fold.metrics.record_line();
            match parser
                .parse(line.as_ref())
                .and_then(|rec| self.extractor.extract(&rec))
            {
                Ok(m) => {
                    #[cfg(feature = "metrics")]
                    fold.metrics.record_accept();
                    if let Some(acc) = fold.aggregates.get_mut(&m.category) {
                        acc.add(&m);
                    } else {
                        fold.aggregates
                            .insert(m.category.clone(), PartialAggregate::from(m));
                    }
                }
                Err(_reject) => {
                    #[cfg(feature = "metrics")]
                    fold.metrics.record_reject(&_reject);
                }
            }
        }
        fold
    }

    /// Finish merged aggregates into sorted statistics rows.
    fn finish(&self, fold: PartitionFold) -> RunOutput {
        let mut rows: Vec<CategoryStats> = fold
            .aggregates
            .into_values()
            .map(|agg| agg.finish(&self.schema))
            .collect();
        rows.sort_by(|a, b| a.category.cmp(&b.category));
        RunOutput {
            rows,
            #[cfg(feature = "metrics")]
            metrics: fold.metrics,
        }
    }
}

/// Merge per-partition folds into one. Order of the folds is irrelevant.
fn merge_folds(folds: Vec<PartitionFold>) -> PartitionFold {
    let mut merged = PartitionFold::default();
    for fold in folds {
        for (category, agg) in fold.aggregates {
            match merged.aggregates.entry(category) {
                Entry::Occupied(mut e) => e.get_mut().merge(agg),
                Entry::Vacant(e) => {
                    e.insert(agg);
                }
            }
        }
        #[cfg(feature = "metrics")]
        merged.metrics.merge(fold.metrics);
    }
    merged
}

/// Split lines into at most `parts` contiguous chunks covering the input.
fn split_lines<S>(lines: &[S], parts: usize) -> Vec<&[S]> {
    let len = lines.len();
    if parts <= 1 || len <= 1 {
        return vec![lines];
    }
    let chunk = len.div_ceil(parts.min(len));
    lines.chunks(chunk).collect()
}

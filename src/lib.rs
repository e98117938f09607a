//! # Tally
//!
//! A **batch aggregation library** for delimited record streams. Tally
//! ingests line-oriented batches (sales exports, staged product catalogs,
//! anything a [`Schema`] can describe), groups records by category, and
//! reduces each group to per-category statistics: a record count plus
//! averages and totals over the schema's numeric columns.
//!
//! ## Key Features
//!
//! - **Schema-driven parsing** - column layout, delimiter, category, and
//!   tracked measures declared in one place, loadable from JSON
//! - **RFC 4180 field splitting** - quoted fields, embedded delimiters,
//!   doubled-quote escapes
//! - **Per-line rejection taxonomy** - bad lines are counted and skipped,
//!   never fatal
//! - **Order-independent aggregation** - partial aggregates merge
//!   associatively and commutatively, so any partitioning of the input
//!   yields identical results
//! - **Sequential and parallel execution** - single-threaded or fanned out
//!   with Rayon
//! - **Batch file ingestion** - glob expansion, multi-file runs,
//!   transparent gzip (feature flags)
//! - **Statistics store** - read-only, case-insensitive access to finished
//!   runs, with cross-category summaries
//! - **Feed staging** - flatten nested JSON product feeds into catalog
//!   records
//!
//! ## Quick Start
//!
//! ```
//! use tally::{Rollup, Schema};
//!
//! # fn main() -> anyhow::Result<()> {
//! let rollup = Rollup::new(Schema::sales())?;
//!
//! let out = rollup.run_lines(&[
//!     "id,name,category,price,quantity,date",
//!     "1,Laptop,electronics,1200.50,2,2024-01-15",
//!     "2,Mouse,electronics,25.00,1,2024-01-16",
//!     "3,Desk,furniture,300.00,1,2024-01-17",
//! ]);
//!
//! let electronics = out.get("electronics").unwrap();
//! assert_eq!(electronics.count, 2);
//! // avg_price, total_quantity, total_revenue
//! assert_eq!(electronics.stats, vec![612.75, 3.0, 2426.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Schema
//!
//! A [`Schema`] names every input column, marks the grouping category, and
//! lists the numeric measures with how each is reported ([`Stat::Average`]
//! or [`Stat::Total`]). Derived fields multiply two measures at extraction
//! time; the built-in sales layout derives `revenue = price * quantity`.
//! [`Schema::sales`] and [`Schema::catalog`] ship ready-made;
//! [`Schema::from_json_file`] loads custom layouts.
//!
//! ### Parse, extract, aggregate
//!
//! Each input line passes through three stages:
//!
//! 1. [`LineParser`] splits the line into fields under RFC 4180 rules and
//!    rejects headers, blanks, misquoted lines, and wrong field counts.
//! 2. [`Extractor`] pulls the category plus every measure as a finite
//!    number, rejecting lines whose numeric columns do not convert.
//! 3. [`PartialAggregate`] folds measurements into per-category running
//!    sums. Partial aggregates merge across partitions, then finish into
//!    [`CategoryStats`] rows, rounding to two decimals only at that final
//!    step.
//!
//! Every rejected line lands in one bucket:
//!
//! | Label                    | Meaning                                   |
//! |--------------------------|-------------------------------------------|
//! | `header-or-blank`        | blank line, or first field equals the schema's first column |
//! | `malformed-quoting`      | a quoted field never closes                |
//! | `arity-mismatch`         | wrong number of fields                     |
//! | `type-conversion-failed` | a numeric column did not parse             |
//!
//! ### Execution Modes
//!
//! [`Rollup`] runs [`ExecMode::Sequential`] on the calling thread or
//! [`ExecMode::Parallel`] on a Rayon pool with configurable thread and
//! partition counts. Both modes produce identical output for the same
//! input; parallel execution only changes how the work is sliced.
//!
//! ## File Batches
//!
//! ```no_run
//! use tally::{Rollup, Schema, write_stats};
//!
//! # fn main() -> anyhow::Result<()> {
//! let rollup = Rollup::new(Schema::sales())?;
//! let out = rollup.run_glob("data/sales_*.csv")?;
//! write_stats("out/stats.csv", rollup.schema(), &out.rows)?;
//! out.metrics.print();
//! # Ok(())
//! # }
//! ```
//!
//! Inputs may be gzipped (`.gz`); detection also falls back to magic bytes
//! for misnamed files. Each file may carry its own header row.
//!
//! ## Reading Results Back
//!
//! A [`ResultStore`] serves finished statistics without mutating them:
//! case-insensitive category lookup, per-column access, and cross-category
//! summaries. A missing file is reported as "no run yet" (`Ok(None)` from
//! [`ResultStore::try_load`]), distinct from a run that produced nothing.
//!
//! ## Feature Flags
//!
//! - `io-csv` - statistics CSV emission and the result store
//! - `compression-gzip` - transparent gzip for file I/O
//! - `metrics` - line/record/rejection counters on every run
//! - `staging` - JSON product feed staging (implies `io-csv`)
//!
//! ## Module Overview
//!
//! - [`schema`] - record layouts and stat column definitions
//! - [`parse`] - line splitting and the rejection taxonomy
//! - [`extract`] - field-to-measurement conversion
//! - [`aggregate`] - partial aggregates, merging, finishing, rounding
//! - [`pipeline`] - the run driver and execution modes
//! - [`io`] - line ingestion, glob expansion, compression, stats emission
//! - [`store`] - read-only access to finished statistics
//! - [`staging`] - product feed flattening
//! - [`metrics`] - run counters
//! - [`testing`] - fixtures and assertions for pipeline tests

pub mod aggregate;
pub mod extract;
pub mod io;
pub mod parse;
pub mod pipeline;
pub mod schema;
pub mod testing;

#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod store;

#[cfg_attr(docsrs, doc(cfg(feature = "staging")))]
#[cfg(feature = "staging")]
pub mod staging;

// General re-exports
pub use aggregate::{CategoryStats, Measurement, PartialAggregate, round2};
pub use extract::Extractor;
pub use io::glob::{expand_glob, expand_glob_required};
pub use io::lines::read_lines;
pub use parse::{LineParser, RawRecord, Reject, split_fields};
pub use pipeline::{ExecMode, Rollup, RunOutput};
pub use schema::{DerivedField, MeasureField, NumKind, Schema, Stat, StatColumn};

// Gated re-exports
#[cfg(feature = "metrics")]
pub use metrics::RunMetrics;

#[cfg(feature = "io-csv")]
pub use io::stats::{format_stat, write_stats};

#[cfg(feature = "io-csv")]
pub use store::{ResultStore, StoreRow, Summary, TopCategory};

#[cfg(feature = "staging")]
pub use staging::{Product, Rating, stage_feed};

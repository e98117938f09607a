//! Line-level record parsing with per-line rejection reasons.
//!
//! Input arrives as raw text lines. [`LineParser`] turns each line into a
//! [`RawRecord`] or a [`Reject`] explaining why the line was skipped. A
//! rejection never aborts a run; the driver counts it and moves on, so one
//! mangled row cannot poison a multi-gigabyte batch.
//!
//! Rejection reasons, checked in order:
//! - [`Reject::HeaderOrBlank`] - the line is empty/whitespace, or its first
//!   field equals the schema's first column name. Header detection is
//!   positional-state-free, so a file can be split at arbitrary offsets and
//!   each partition still handles a stray header correctly.
//! - [`Reject::MalformedQuoting`] - a quoted field never closes.
//! - [`Reject::ArityMismatch`] - the field count differs from the schema's.
//! - [`Reject::TypeConversion`] - a numeric column fails conversion. Raised
//!   downstream by the extractor, reported through the same taxonomy.
//!
//! Field splitting follows RFC 4180: a quote opens a quoted field only at
//! the start of that field, delimiters inside quotes are literal, and a
//! doubled quote inside a quoted field denotes one quote character.
//!
//! ```
//! use tally::{LineParser, Reject, Schema};
//!
//! let schema = Schema::sales();
//! let mut parser = LineParser::new(&schema);
//!
//! let rec = parser.parse(r#"7,"Mouse, wireless",electronics,25.00,1,2024-01-15"#).unwrap();
//! assert_eq!(rec.fields[1], "Mouse, wireless");
//!
//! assert_eq!(
//!     parser.parse("id,name,category,price,quantity,date"),
//!     Err(Reject::HeaderOrBlank),
//! );
//! ```

use crate::schema::Schema;
use std::fmt;

/// Why a line was skipped instead of parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reject {
    /// Blank line, or a repeated header row.
    HeaderOrBlank,
    /// A quoted field was opened and never closed.
    MalformedQuoting,
    /// The line split into the wrong number of fields.
    ArityMismatch { expected: usize, found: usize },
    /// A numeric column did not convert to its declared type.
    TypeConversion { column: String, value: String },
}

impl Reject {
    /// Stable label used as the metrics key for this rejection reason.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Reject::HeaderOrBlank => "header-or-blank",
            Reject::MalformedQuoting => "malformed-quoting",
            Reject::ArityMismatch { .. } => "arity-mismatch",
            Reject::TypeConversion { .. } => "type-conversion-failed",
        }
    }
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reject::HeaderOrBlank => f.write_str("header or blank line"),
            Reject::MalformedQuoting => f.write_str("unbalanced quoting"),
            Reject::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Reject::TypeConversion { column, value } => {
                write!(f, "cannot convert '{value}' in column '{column}'")
            }
        }
    }
}

impl std::error::Error for Reject {}

/// One successfully split record, fields in schema column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<String>,
}

/// Splits one line into fields under RFC 4180 quoting rules.
///
/// Returns `None` when a quoted field is left unterminated. A quote only
/// opens quoting at the start of a field; elsewhere it is a literal
/// character, matching the common lenient reader behavior.
#[must_use]
pub fn split_fields(line: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut field_started = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && !field_started {
            in_quotes = true;
            field_started = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
            field_started = false;
        } else {
            field.push(c);
            field_started = true;
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(field);
    Some(fields)
}

/// Stateful per-partition line parser for one [`Schema`].
///
/// The only state is an observational `header_seen` flag; parse results
/// never depend on line order, which keeps partitioned runs equivalent to
/// sequential ones.
#[derive(Clone, Debug)]
pub struct LineParser {
    arity: usize,
    leading: String,
    delimiter: char,
    header_seen: bool,
}

impl LineParser {
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        Self {
            arity: schema.arity(),
            leading: schema.leading_column().to_string(),
            delimiter: schema.delimiter,
            header_seen: false,
        }
    }

    /// Parse one line into a record.
    ///
    /// # Errors
    /// Returns the [`Reject`] reason when the line is a header, blank,
    /// misquoted, or has the wrong field count.
    pub fn parse(&mut self, line: &str) -> Result<RawRecord, Reject> {
        if line.trim().is_empty() {
            return Err(Reject::HeaderOrBlank);
        }
        let fields = split_fields(line, self.delimiter).ok_or(Reject::MalformedQuoting)?;
        if fields.first().is_some_and(|f| *f == self.leading) {
            self.header_seen = true;
            return Err(Reject::HeaderOrBlank);
        }
        if fields.len() != self.arity {
            return Err(Reject::ArityMismatch {
                expected: self.arity,
                found: fields.len(),
            });
        }
        Ok(RawRecord { fields })
    }

    /// Whether this parser has rejected a header row so far.
    #[must_use]
    pub fn header_seen(&self) -> bool {
        self.header_seen
    }
}

//! Record-to-measurement extraction.
//!
//! An [`Extractor`] is built once per run from a [`Schema`]: it resolves
//! every named column to a field index up front so the per-record hot path
//! does no string lookups. Each record yields a [`Measurement`] carrying the
//! grouping category and one `f64` per tracked value, measures first, then
//! derived products.
//!
//! Numeric conversion trims surrounding whitespace, parses integer columns
//! as `i64` and float columns as `f64`, and rejects non-finite values, so
//! everything downstream can rely on finite arithmetic.
//!
//! ```
//! use tally::{Extractor, LineParser, Schema};
//!
//! let schema = Schema::sales();
//! let extractor = Extractor::new(&schema)?;
//! let mut parser = LineParser::new(&schema);
//!
//! let rec = parser.parse("1,Laptop,electronics,1200.50,2,2024-01-15").unwrap();
//! let m = extractor.extract(&rec).unwrap();
//! assert_eq!(m.category, "electronics");
//! assert_eq!(m.values, vec![1200.50, 2.0, 2401.0]);
//! # anyhow::Ok(())
//! ```

use crate::aggregate::Measurement;
use crate::parse::{RawRecord, Reject};
use crate::schema::{NumKind, Schema};
use anyhow::{Context, Result};

struct MeasureSlot {
    column: String,
    index: usize,
    kind: NumKind,
}

/// Pulls the category and all numeric values out of parsed records.
pub struct Extractor {
    category_index: usize,
    measures: Vec<MeasureSlot>,
    /// Pairs of positions into the measure values whose product is appended.
    derived: Vec<(usize, usize)>,
}

impl Extractor {
    /// Resolve a schema's named columns to field indices.
    ///
    /// # Errors
    /// Returns an error if the schema references a column it does not
    /// declare; [`Schema::validate`] catches the same problems earlier with
    /// fuller messages.
    pub fn new(schema: &Schema) -> Result<Self> {
        let position = |column: &str| {
            schema
                .columns
                .iter()
                .position(|c| c == column)
                .with_context(|| format!("column '{column}' not in schema"))
        };
        let measure_pos = |column: &str| {
            schema
                .measures
                .iter()
                .position(|m| m.column == column)
                .with_context(|| format!("measure '{column}' not in schema"))
        };

        let measures = schema
            .measures
            .iter()
            .map(|m| {
                Ok(MeasureSlot {
                    column: m.column.clone(),
                    index: position(&m.column)?,
                    kind: m.kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let derived = schema
            .derived
            .iter()
            .map(|d| Ok((measure_pos(&d.left)?, measure_pos(&d.right)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            category_index: schema.category_index()?,
            measures,
            derived,
        })
    }

    /// Convert one record into a measurement.
    ///
    /// # Errors
    /// Returns [`Reject::TypeConversion`] naming the first column whose
    /// field does not parse as its declared numeric type.
    pub fn extract(&self, record: &RawRecord) -> Result<Measurement, Reject> {
        let fields = &record.fields;
        debug_assert!(fields.len() > self.category_index);

        let mut values = Vec::with_capacity(self.measures.len() + self.derived.len());
        for slot in &self.measures {
            values.push(convert(&fields[slot.index], slot.kind).ok_or_else(|| {
                Reject::TypeConversion {
                    column: slot.column.clone(),
                    value: fields[slot.index].clone(),
                }
            })?);
        }
        for &(left, right) in &self.derived {
            values.push(values[left] * values[right]);
        }

        Ok(Measurement {
            category: fields[self.category_index].clone(),
            values,
        })
    }
}

/// Parse one field as its declared numeric kind. Whitespace around the
/// value is tolerated; non-finite floats are not.
fn convert(field: &str, kind: NumKind) -> Option<f64> {
    let text = field.trim();
    match kind {
        NumKind::Integer => text.parse::<i64>().ok().map(|n| n as f64),
        NumKind::Float => text.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

//! The combine/reduce core: measurements fold into partial aggregates,
//! partial aggregates merge, and a finished aggregate becomes one
//! statistics row.
//!
//! [`PartialAggregate`] is a commutative monoid under [`merge`]: merging is
//! associative and commutative, and a fresh aggregate from
//! [`PartialAggregate::new`] is the identity. Any way of slicing a stream of
//! measurements into chunks, folding each chunk, and merging the results
//! yields the same aggregate, which is what makes arbitrary partitioning
//! safe.
//!
//! Running sums keep full `f64` precision. Rounding to two decimals happens
//! exactly once, in [`PartialAggregate::finish`], so intermediate merges
//! never accumulate rounding error.
//!
//! [`merge`]: PartialAggregate::merge
//!
//! ```
//! use tally::{Measurement, PartialAggregate, Schema};
//!
//! let schema = Schema::sales();
//! // values are price, quantity, revenue (price * quantity)
//! let a = Measurement { category: "electronics".into(), values: vec![10.0, 2.0, 20.0] };
//! let b = Measurement { category: "electronics".into(), values: vec![20.0, 1.0, 20.0] };
//!
//! let mut left = PartialAggregate::from(a);
//! left.merge(PartialAggregate::from(b));
//!
//! let row = left.finish(&schema);
//! assert_eq!(row.count, 2);
//! assert_eq!(row.stats, vec![15.0, 3.0, 40.0]);
//! ```

use crate::schema::{Schema, Stat};

/// One record's contribution: its category and one finite `f64` per tracked
/// value, measures first, then derived products. Every measurement carries
/// unit weight; counts are recovered by the aggregate, not stored here.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub category: String,
    pub values: Vec<f64>,
}

/// Running totals for one category: a record count plus one sum per tracked
/// value.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialAggregate {
    pub category: String,
    pub count: u64,
    pub sums: Vec<f64>,
}

impl PartialAggregate {
    /// The identity aggregate for `category`: zero count, zero sums.
    #[must_use]
    pub fn new(category: String, width: usize) -> Self {
        Self {
            category,
            count: 0,
            sums: vec![0.0; width],
        }
    }

    /// Fold one measurement in. The measurement must belong to this
    /// aggregate's category and have matching width.
    pub fn add(&mut self, m: &Measurement) {
        debug_assert_eq!(self.category, m.category);
        debug_assert_eq!(self.sums.len(), m.values.len());
        self.count += 1;
        for (sum, v) in self.sums.iter_mut().zip(&m.values) {
            *sum += v;
        }
    }

    /// Merge another partial aggregate for the same category into this one.
    /// Associative and commutative.
    pub fn merge(&mut self, other: PartialAggregate) {
        debug_assert_eq!(self.category, other.category);
        debug_assert_eq!(self.sums.len(), other.sums.len());
        self.count += other.count;
        for (sum, v) in self.sums.iter_mut().zip(other.sums) {
            *sum += v;
        }
    }

    /// Fold a sequence of same-category measurements into one aggregate.
    /// Returns `None` for an empty sequence; there is no aggregate without
    /// at least one measurement to name its category.
    pub fn combine<I>(measurements: I) -> Option<Self>
    where
        I: IntoIterator<Item = Measurement>,
    {
        let mut iter = measurements.into_iter();
        let mut acc = Self::from(iter.next()?);
        for m in iter {
            acc.add(&m);
        }
        Some(acc)
    }

    /// Reduce this aggregate to a finished statistics row.
    ///
    /// `Average` values divide by the count, `Total` values pass the sum
    /// through; both are rounded to two decimals here and nowhere else. A
    /// zero-count aggregate reports averages of `0.0` rather than NaN.
    #[must_use]
    pub fn finish(self, schema: &Schema) -> CategoryStats {
        debug_assert_eq!(self.sums.len(), schema.value_count());
        let order = schema
            .measures
            .iter()
            .map(|m| m.stat)
            .chain(schema.derived.iter().map(|d| d.stat));
        let count = self.count;
        let stats = self
            .sums
            .iter()
            .zip(order)
            .map(|(&sum, stat)| match stat {
                Stat::Average if count == 0 => 0.0,
                Stat::Average => round2(sum / count as f64),
                Stat::Total => round2(sum),
            })
            .collect();
        CategoryStats {
            category: self.category,
            count,
            stats,
        }
    }
}

impl From<Measurement> for PartialAggregate {
    fn from(m: Measurement) -> Self {
        Self {
            category: m.category,
            count: 1,
            sums: m.values,
        }
    }
}

/// One finished output row: category, record count, and the rounded
/// statistics in [`Schema::stat_columns`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub count: u64,
    pub stats: Vec<f64>,
}

/// Round to two decimal places, ties away from zero.
#[must_use]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

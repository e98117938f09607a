//! Declarative record layouts for the rollup pipeline.
//!
//! A [`Schema`] names every column of a delimited input format, marks which
//! column carries the grouping category, and lists the numeric columns to
//! extract together with how each one is reported (averaged or totaled).
//! The same schema also fixes the layout of the finished statistics rows, so
//! the extractor and the reducer are configured from one place instead of
//! being duplicated per input format.
//!
//! Two layouts ship built in:
//! - [`Schema::sales`] - `id, name, category, price, quantity, date`,
//!   reported as `count, avg_price, total_quantity, total_revenue`
//! - [`Schema::catalog`] - `id, title, price, description, category, image,
//!   rating_rate, rating_count`, reported as
//!   `count, avg_price, avg_rating, total_reviews`
//!
//! Schemas are plain Serde values and can be loaded from JSON:
//!
//! ```
//! use tally::Schema;
//!
//! let schema = Schema::from_json_str(r#"{
//!     "columns": ["sku", "warehouse", "units"],
//!     "category": "warehouse",
//!     "measures": [
//!         { "column": "units", "kind": "integer", "stat": "total", "output": "total_units" }
//!     ]
//! }"#)?;
//! assert_eq!(schema.arity(), 3);
//! # anyhow::Ok(())
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a numeric column is reported in the finished statistics row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Report the per-category mean (`total / count`).
    Average,
    /// Report the per-category sum.
    Total,
}

/// Numeric type a column is converted to during extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumKind {
    Integer,
    Float,
}

/// A numeric input column extracted from every record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureField {
    /// Input column this measure reads.
    pub column: String,
    pub kind: NumKind,
    pub stat: Stat,
    /// Column name in the statistics output, e.g. `avg_price`.
    pub output: String,
}

/// A value computed from two measures at extraction time rather than read
/// from the input, e.g. `revenue = price * quantity`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedField {
    /// Name of the derived value, e.g. `revenue`.
    pub name: String,
    /// Measure columns whose product defines this field.
    pub left: String,
    pub right: String,
    pub stat: Stat,
    /// Column name in the statistics output, e.g. `total_revenue`.
    pub output: String,
}

/// One column of the finished statistics row, in output order.
#[derive(Clone, Copy, Debug)]
pub struct StatColumn<'a> {
    /// Output column name.
    pub output: &'a str,
    pub stat: Stat,
    /// True when the value is a sum of integers, so it is formatted without
    /// decimal places.
    pub integral: bool,
}

/// Declarative layout of one delimited input format.
///
/// `columns` fixes the expected arity and the header row; `category` names
/// the grouping column; `measures` and `derived` define every numeric value
/// the pipeline tracks, in the order they appear in the output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// All input column names, in input order.
    pub columns: Vec<String>,
    /// Name of the column holding the grouping category.
    pub category: String,
    /// Numeric columns extracted from each record.
    pub measures: Vec<MeasureField>,
    /// Values computed from pairs of measures at extraction time.
    #[serde(default)]
    pub derived: Vec<DerivedField>,
    /// Field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl Schema {
    /// The sales layout: `id, name, category, price, quantity, date`.
    ///
    /// Reported per category as `count, avg_price, total_quantity,
    /// total_revenue`, where revenue is derived as `price * quantity`.
    #[must_use]
    pub fn sales() -> Self {
        Self {
            columns: ["id", "name", "category", "price", "quantity", "date"]
                .map(String::from)
                .to_vec(),
            category: "category".to_string(),
            measures: vec![
                MeasureField {
                    column: "price".to_string(),
                    kind: NumKind::Float,
                    stat: Stat::Average,
                    output: "avg_price".to_string(),
                },
                MeasureField {
                    column: "quantity".to_string(),
                    kind: NumKind::Integer,
                    stat: Stat::Total,
                    output: "total_quantity".to_string(),
                },
            ],
            derived: vec![DerivedField {
                name: "revenue".to_string(),
                left: "price".to_string(),
                right: "quantity".to_string(),
                stat: Stat::Total,
                output: "total_revenue".to_string(),
            }],
            delimiter: ',',
        }
    }

    /// The product-catalog layout: `id, title, price, description, category,
    /// image, rating_rate, rating_count`.
    ///
    /// Reported per category as `count, avg_price, avg_rating,
    /// total_reviews`.
    #[must_use]
    pub fn catalog() -> Self {
        Self {
            columns: [
                "id",
                "title",
                "price",
                "description",
                "category",
                "image",
                "rating_rate",
                "rating_count",
            ]
            .map(String::from)
            .to_vec(),
            category: "category".to_string(),
            measures: vec![
                MeasureField {
                    column: "price".to_string(),
                    kind: NumKind::Float,
                    stat: Stat::Average,
                    output: "avg_price".to_string(),
                },
                MeasureField {
                    column: "rating_rate".to_string(),
                    kind: NumKind::Float,
                    stat: Stat::Average,
                    output: "avg_rating".to_string(),
                },
                MeasureField {
                    column: "rating_count".to_string(),
                    kind: NumKind::Integer,
                    stat: Stat::Total,
                    output: "total_reviews".to_string(),
                },
            ],
            derived: vec![],
            delimiter: ',',
        }
    }

    /// Load and validate a schema from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON does not deserialize into a schema or if
    /// the schema fails [`Schema::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json).context("parse schema JSON")?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a schema from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the contents fail
    /// [`Schema::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json =
            fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("invalid schema in {}", path.display()))
    }

    /// Number of fields every record must have.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// First column name; a line whose first field equals this token is
    /// treated as a header row.
    #[must_use]
    pub fn leading_column(&self) -> &str {
        self.columns.first().map_or("", String::as_str)
    }

    /// Position of the category column.
    ///
    /// # Errors
    /// Returns an error if the named category column does not exist.
    pub fn category_index(&self) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| *c == self.category)
            .with_context(|| format!("category column '{}' not in columns", self.category))
    }

    /// Names of every tracked numeric value, measures first, then derived
    /// fields, matching the value order inside measurements and aggregates.
    #[must_use]
    pub fn value_names(&self) -> Vec<&str> {
        self.measures
            .iter()
            .map(|m| m.column.as_str())
            .chain(self.derived.iter().map(|d| d.name.as_str()))
            .collect()
    }

    /// Number of numeric values tracked per record.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.measures.len() + self.derived.len()
    }

    /// The statistics columns that follow `category, count` in the output,
    /// in order.
    #[must_use]
    pub fn stat_columns(&self) -> Vec<StatColumn<'_>> {
        let kind_of = |column: &str| {
            self.measures
                .iter()
                .find(|m| m.column == column)
                .map(|m| m.kind)
        };
        let mut cols: Vec<StatColumn<'_>> = self
            .measures
            .iter()
            .map(|m| StatColumn {
                output: &m.output,
                stat: m.stat,
                integral: m.kind == NumKind::Integer && m.stat == Stat::Total,
            })
            .collect();
        cols.extend(self.derived.iter().map(|d| StatColumn {
            output: &d.output,
            stat: d.stat,
            integral: d.stat == Stat::Total
                && kind_of(&d.left) == Some(NumKind::Integer)
                && kind_of(&d.right) == Some(NumKind::Integer),
        }));
        cols
    }

    /// The header row this schema expects on its input.
    #[must_use]
    pub fn header_line(&self) -> String {
        self.columns.join(&self.delimiter.to_string())
    }

    /// Check the schema for internal consistency.
    ///
    /// # Errors
    /// Returns an error if the category column is missing, a measure
    /// references an unknown or non-data column, output names collide, a
    /// derived field references an unknown measure, or the delimiter is not
    /// a single ASCII character.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            bail!("schema has no columns");
        }
        if !self.delimiter.is_ascii() {
            bail!("delimiter '{}' is not an ASCII character", self.delimiter);
        }
        let category_index = self.category_index()?;
        if self.measures.is_empty() && self.derived.is_empty() {
            bail!("schema tracks no numeric values");
        }
        for m in &self.measures {
            let idx = self
                .columns
                .iter()
                .position(|c| *c == m.column)
                .with_context(|| format!("measure column '{}' not in columns", m.column))?;
            if idx == category_index {
                bail!("measure column '{}' is the category column", m.column);
            }
        }
        for d in &self.derived {
            for operand in [&d.left, &d.right] {
                if !self.measures.iter().any(|m| m.column == *operand) {
                    bail!(
                        "derived field '{}' references unknown measure '{operand}'",
                        d.name
                    );
                }
            }
        }
        let mut outputs: Vec<&str> = self
            .measures
            .iter()
            .map(|m| m.output.as_str())
            .chain(self.derived.iter().map(|d| d.output.as_str()))
            .collect();
        outputs.sort_unstable();
        if outputs.windows(2).any(|w| w[0] == w[1]) {
            bail!("duplicate output column name in schema");
        }
        Ok(())
    }
}

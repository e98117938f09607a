//! Statistics emission as CSV.

use crate::aggregate::CategoryStats;
use crate::io::compression::auto_detect_writer;
use crate::schema::Schema;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Write finished statistics rows to a CSV file with a header row.
///
/// Columns are `category, count`, then the schema's stat columns in order.
/// Averages and float totals are printed with two decimals; integer totals
/// are printed without a decimal point.
///
/// * Creates parent directories if they don't exist.
/// * Compresses transparently when the path ends in `.gz`.
///
/// # Returns
/// The number of data rows written (i.e., `rows.len()`).
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or any row fails to
/// write or flush.
pub fn write_stats(
    path: impl AsRef<Path>,
    schema: &Schema,
    rows: &[CategoryStats],
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    let mut wtr = WriterBuilder::new().from_writer(w);

    let columns = schema.stat_columns();
    let mut header = vec!["category".to_string(), "count".to_string()];
    header.extend(columns.iter().map(|c| c.output.to_string()));
    wtr.write_record(&header)
        .context("write stats header")?;

    for row in rows {
        debug_assert_eq!(row.stats.len(), columns.len());
        let mut record = vec![row.category.clone(), row.count.to_string()];
        record.extend(
            row.stats
                .iter()
                .zip(&columns)
                .map(|(&v, col)| format_stat(v, col.integral)),
        );
        wtr.write_record(&record)
            .with_context(|| format!("write stats row for '{}'", row.category))?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Format one statistic for output: two decimals unless the column is an
/// integer total.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_stat(v: f64, integral: bool) -> String {
    if integral {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}

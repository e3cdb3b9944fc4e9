//! Defect detection over a [`Table`].
//!
//! Detects the three defect families the engine remediates: missing
//! values, duplicate rows, and statistical outliers. Detection never
//! mutates the table.
//!
//! Two outlier rules exist on purpose and must stay distinct: the IQR rule
//! (robust to skew, used by the cleaner to decide what to remediate) and
//! the 3-sigma z-score rule (standard reporting convention, used by the
//! report generator). [`OutlierRule`] names the choice.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use arrow::array::Array;
use serde::Serialize;

use crate::{
    error::Result,
    stats,
    table::Table,
};

/// Which outlier definition a detection pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlierRule {
    /// Strictly outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    Iqr,
    /// Strictly more than 3 sample standard deviations from the mean.
    ZScore,
}

impl OutlierRule {
    /// Human-readable rule name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Iqr => "1.5*IQR",
            Self::ZScore => "3-sigma z-score",
        }
    }
}

/// One detection pass over a table: per-column missing counts, the
/// duplicate-row count, and per-numeric-column outlier counts.
///
/// Produced fresh by every [`Inspector::inspect`] call; never partially
/// populated and never cached across mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    /// Count of absent cells per column, every column present.
    pub missing: BTreeMap<String, usize>,
    /// Rows that repeat an earlier row under the active key definition.
    pub duplicates: usize,
    /// Outlier count per numeric column, zero counts included.
    pub outliers: BTreeMap<String, usize>,
}

impl IssueSummary {
    /// Total defect count: all missing cells, plus duplicate rows, plus
    /// all outliers.
    #[must_use]
    pub fn total_defects(&self) -> usize {
        self.missing.values().sum::<usize>()
            + self.duplicates
            + self.outliers.values().sum::<usize>()
    }

    /// True when no defects were detected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_defects() == 0
    }
}

/// Plain-text rendering: one upper-cased section per top-level key,
/// blank line between sections. This is the layout the report-file
/// collaborator persists.
impl fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MISSING:")?;
        for (col, count) in &self.missing {
            writeln!(f, "{col}: {count}")?;
        }
        writeln!(f)?;
        writeln!(f, "DUPLICATES:")?;
        writeln!(f, "{}", self.duplicates)?;
        writeln!(f)?;
        writeln!(f, "OUTLIERS:")?;
        for (col, count) in &self.outliers {
            writeln!(f, "{col}: {count}")?;
        }
        Ok(())
    }
}

/// Per-column count of absent cells (Arrow validity bitmap). Every
/// column appears, zero counts included.
pub(crate) fn missing_counts(table: &Table) -> BTreeMap<String, usize> {
    let batch = table.batch();
    table
        .column_names()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, batch.column(idx).null_count()))
        .collect()
}

/// Count of rows that duplicate an earlier row.
///
/// With `key = None` equality spans all cells in column order; with a key
/// it is restricted to the named columns. First occurrences are not
/// counted. Nulls compare equal; floats compare by bit pattern.
pub(crate) fn duplicate_count(table: &Table, key: Option<&[String]>) -> Result<usize> {
    let key_indices: Vec<usize> = match key {
        Some(cols) => cols
            .iter()
            .map(|name| table.column_index(name))
            .collect::<Result<Vec<_>>>()?,
        None => (0..table.num_columns()).collect(),
    };

    if key_indices.is_empty() || table.is_empty() {
        return Ok(0);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0;

    for row_idx in 0..table.num_rows() {
        let row = row_key(table, row_idx, &key_indices)?;
        if !seen.insert(row) {
            duplicates += 1;
        }
    }

    Ok(duplicates)
}

/// Builds the equality key for one row over the given columns.
pub(crate) fn row_key(table: &Table, row_idx: usize, key_indices: &[usize]) -> Result<String> {
    let mut parts: Vec<String> = Vec::with_capacity(key_indices.len());
    for &col_idx in key_indices {
        parts.push(table.cell(col_idx, row_idx)?.key_fragment());
    }
    Ok(parts.join("\x00"))
}

/// Per-numeric-column outlier count under the given rule. Non-numeric
/// columns never appear; numeric columns always do, zero counts included.
pub(crate) fn outlier_counts(table: &Table, rule: OutlierRule) -> BTreeMap<String, usize> {
    let mut outliers = BTreeMap::new();

    for (idx, name) in table.column_names().into_iter().enumerate() {
        if !table.is_numeric(idx) {
            continue;
        }
        let values = table.numeric_values(idx);
        let count = match bounds_for(&values, rule) {
            Some((lower, upper)) => values.iter().filter(|&&v| v < lower || v > upper).count(),
            None => 0,
        };
        outliers.insert(name, count);
    }

    outliers
}

/// The non-outlier interval for a column's finite values under `rule`,
/// or `None` when the rule's statistics are undefined for the input.
pub(crate) fn bounds_for(values: &[f64], rule: OutlierRule) -> Option<(f64, f64)> {
    match rule {
        OutlierRule::Iqr => {
            let sorted = stats::sorted(values.to_vec());
            stats::iqr_fences(&sorted)
        }
        OutlierRule::ZScore => {
            let m = stats::mean(values)?;
            let std = stats::sample_std(values)?;
            Some((m - 3.0 * std, m + 3.0 * std))
        }
    }
}

/// One full detection pass combining all three defect families.
pub(crate) fn summarize(table: &Table, rule: OutlierRule) -> Result<IssueSummary> {
    Ok(IssueSummary {
        missing: missing_counts(table),
        duplicates: duplicate_count(table, None)?,
        outliers: outlier_counts(table, rule),
    })
}

/// Stateless defect detection over an owned copy of a [`Table`].
///
/// # Example
///
/// ```no_run
/// use remediar::{Inspector, Table};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// let summary = Inspector::new(table).inspect().unwrap();
/// println!("{} total defects", summary.total_defects());
/// ```
#[derive(Debug, Clone)]
pub struct Inspector {
    table: Table,
}

impl Inspector {
    /// Creates an inspector over its own copy of the table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// The inspected table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of rows in the inspected table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Per-column missing-value counts.
    #[must_use]
    pub fn detect_missing(&self) -> BTreeMap<String, usize> {
        missing_counts(&self.table)
    }

    /// Duplicate-row count, whole-row or restricted to key columns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ColumnNotFound`] for an unknown key column
    /// and [`crate::Error::UnsupportedColumnType`] when row equality must
    /// read a column type outside the supported set.
    pub fn detect_duplicates(&self, key: Option<&[String]>) -> Result<usize> {
        duplicate_count(&self.table, key)
    }

    /// Per-numeric-column outlier counts under the IQR rule.
    #[must_use]
    pub fn detect_outliers(&self) -> BTreeMap<String, usize> {
        outlier_counts(&self.table, OutlierRule::Iqr)
    }

    /// Runs all three detections and combines them.
    ///
    /// # Errors
    ///
    /// Propagates the duplicate-detection errors; missing and outlier
    /// detection cannot fail.
    pub fn inspect(&self) -> Result<IssueSummary> {
        summarize(&self.table, OutlierRule::Iqr)
    }
}

/// Inspectors compare by table contents, not identity: two inspectors
/// over structurally identical tables are equal.
impl PartialEq for Inspector {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Float64Array, Int64Array, RecordBatch, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;

    fn age_name_table() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Float64, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![
                    Some(25.0),
                    Some(26.0),
                    Some(1000.0),
                    Some(24.0),
                    None,
                ])),
                Arc::new(StringArray::from(vec![
                    Some("A"),
                    Some("B"),
                    Some("C"),
                    Some("A"),
                    Some("E"),
                ])),
            ],
        )
        .unwrap();
        Table::from_batch(batch)
    }

    #[test]
    fn test_detect_missing() {
        let inspector = Inspector::new(age_name_table());
        let missing = inspector.detect_missing();
        assert_eq!(missing["age"], 1);
        assert_eq!(missing["name"], 0);
    }

    #[test]
    fn test_detect_duplicates_whole_row() {
        let inspector = Inspector::new(age_name_table());
        // No fully identical rows.
        assert_eq!(inspector.detect_duplicates(None).unwrap(), 0);
    }

    #[test]
    fn test_detect_duplicates_keyed() {
        let inspector = Inspector::new(age_name_table());
        // "A" appears twice in name.
        let key = vec!["name".to_string()];
        assert_eq!(inspector.detect_duplicates(Some(&key)).unwrap(), 1);
    }

    #[test]
    fn test_detect_duplicates_unknown_key() {
        let inspector = Inspector::new(age_name_table());
        let key = vec!["nope".to_string()];
        assert!(inspector.detect_duplicates(Some(&key)).is_err());
    }

    #[test]
    fn test_detect_outliers_iqr() {
        let inspector = Inspector::new(age_name_table());
        let outliers = inspector.detect_outliers();
        // 1000 sits far outside the fences of the other four values.
        assert_eq!(outliers["age"], 1);
        assert!(!outliers.contains_key("name"));
    }

    #[test]
    fn test_zero_variance_flags_non_equal_values() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from(vec![5, 5, 5, 5, 5, 5, 5, 9]))],
        )
        .unwrap();
        let inspector = Inspector::new(Table::from_batch(batch));
        assert_eq!(inspector.detect_outliers()["x"], 1);
    }

    #[test]
    fn test_inspect_combines_all_three() {
        let summary = Inspector::new(age_name_table()).inspect().unwrap();
        assert_eq!(summary.missing["age"], 1);
        assert_eq!(summary.duplicates, 0);
        assert_eq!(summary.outliers["age"], 1);
        assert_eq!(summary.total_defects(), 2);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_inspectors_compare_by_content() {
        let a = Inspector::new(age_name_table());
        let b = Inspector::new(age_name_table());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_schema_yields_empty_summary() {
        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::empty()),
            vec![],
            &arrow::array::RecordBatchOptions::new().with_row_count(Some(0)),
        )
        .unwrap();
        let summary = Inspector::new(Table::from_batch(batch)).inspect().unwrap();
        assert!(summary.missing.is_empty());
        assert_eq!(summary.duplicates, 0);
        assert!(summary.outliers.is_empty());
        assert!(summary.is_clean());
    }

    #[test]
    fn test_summary_render_sections() {
        let summary = Inspector::new(age_name_table()).inspect().unwrap();
        let text = summary.to_string();
        assert!(text.contains("MISSING:\nage: 1\nname: 0\n"));
        assert!(text.contains("DUPLICATES:\n0\n"));
        assert!(text.contains("OUTLIERS:\nage: 1\n"));
    }
}

//! Remediation of detected defects.
//!
//! The [`Cleaner`] composes the detection capability of [`crate::Inspector`]
//! with the remediation strategies and an append-only fix log. It owns its
//! Table copy and is the only component besides [`crate::Organizer`] that
//! mutates one.
//!
//! Strategies are tagged enums rather than free-form strings; an
//! unrecognized name fails at the [`std::str::FromStr`] boundary before any
//! mutation is attempted.

// Statistical fills require float/int casts
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
        RecordBatch, StringArray, UInt64Array,
    },
    datatypes::DataType,
};

use crate::{
    error::{Error, Result},
    inspect::{self, IssueSummary, OutlierRule},
    stats,
    table::Table,
};

/// How missing numeric cells are filled.
///
/// Non-numeric columns always fill with the mode (or `"Unknown"` when no
/// mode exists) regardless of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingStrategy {
    /// Fill with the column mean.
    #[default]
    Mean,
    /// Fill with the column median.
    Median,
}

impl FromStr for MissingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            other => Err(Error::invalid_strategy(other, "'mean', 'median'")),
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Median => write!(f, "median"),
        }
    }
}

/// How outlier cells are remediated. Clipping to the IQR fences is the
/// only strategy today; the enum reserves room for future ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlierStrategy {
    /// Clip strictly-outside values to the nearest fence.
    #[default]
    Clip,
}

impl FromStr for OutlierStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clip" => Ok(Self::Clip),
            other => Err(Error::invalid_strategy(other, "'clip'")),
        }
    }
}

impl fmt::Display for OutlierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clip => write!(f, "clip"),
        }
    }
}

/// Configuration for one [`Cleaner::treat`] run.
///
/// Every enabled phase runs exactly once, in the fixed order missing →
/// duplicates → outliers, whether or not it finds anything to do.
///
/// # Example
///
/// ```
/// use remediar::{MissingStrategy, TreatOptions};
///
/// let options = TreatOptions::new()
///     .missing_strategy(MissingStrategy::Median)
///     .dedup_key(vec!["id".to_string()]);
/// assert!(options.treat_outliers);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TreatOptions {
    /// Run the missing-value phase.
    pub treat_missing: bool,
    /// Run the duplicate-row phase.
    pub treat_duplicates: bool,
    /// Run the outlier phase.
    pub treat_outliers: bool,
    /// Numeric fill strategy for the missing-value phase.
    pub missing_strategy: MissingStrategy,
    /// Remediation strategy for the outlier phase.
    pub outlier_strategy: OutlierStrategy,
    /// Key columns for the duplicate phase; whole-row when `None`.
    pub dedup_key: Option<Vec<String>>,
}

impl Default for TreatOptions {
    fn default() -> Self {
        Self {
            treat_missing: true,
            treat_duplicates: true,
            treat_outliers: true,
            missing_strategy: MissingStrategy::default(),
            outlier_strategy: OutlierStrategy::default(),
            dedup_key: None,
        }
    }
}

impl TreatOptions {
    /// Default options: all phases enabled, mean fill, clip, whole-row
    /// deduplication.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the missing-value phase.
    #[must_use]
    pub fn with_missing(mut self, enabled: bool) -> Self {
        self.treat_missing = enabled;
        self
    }

    /// Enable or disable the duplicate-row phase.
    #[must_use]
    pub fn with_duplicates(mut self, enabled: bool) -> Self {
        self.treat_duplicates = enabled;
        self
    }

    /// Enable or disable the outlier phase.
    #[must_use]
    pub fn with_outliers(mut self, enabled: bool) -> Self {
        self.treat_outliers = enabled;
        self
    }

    /// Set the numeric fill strategy.
    #[must_use]
    pub fn missing_strategy(mut self, strategy: MissingStrategy) -> Self {
        self.missing_strategy = strategy;
        self
    }

    /// Set the outlier strategy.
    #[must_use]
    pub fn outlier_strategy(mut self, strategy: OutlierStrategy) -> Self {
        self.outlier_strategy = strategy;
        self
    }

    /// Restrict duplicate detection to the named key columns.
    #[must_use]
    pub fn dedup_key(mut self, key: Vec<String>) -> Self {
        self.dedup_key = Some(key);
        self
    }
}

/// Detects and remediates data-quality defects on its owned Table.
///
/// The fix log is a monotonic audit trail: one human-readable line per
/// corrective action, never reordered, never truncated, for the lifetime
/// of the cleaner. There is no undo.
///
/// # Example
///
/// ```no_run
/// use remediar::{Cleaner, Table, TreatOptions};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// let mut cleaner = Cleaner::new(table);
/// for (subject, notes) in cleaner.diagnose().unwrap() {
///     println!("{subject}: {notes:?}");
/// }
/// let cleaned = cleaner.treat(&TreatOptions::new()).unwrap();
/// println!("{} rows after treatment", cleaned.num_rows());
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    table: Table,
    fix_log: Vec<String>,
}

impl Cleaner {
    /// Creates a cleaner over its own copy of the table, with an empty
    /// fix log.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self {
            table,
            fix_log: Vec::new(),
        }
    }

    /// The current (possibly treated) table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of rows in the current table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Per-column missing-value counts (same detection as the inspector).
    #[must_use]
    pub fn detect_missing(&self) -> BTreeMap<String, usize> {
        inspect::missing_counts(&self.table)
    }

    /// Duplicate-row count under the given key definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] for an unknown key column.
    pub fn detect_duplicates(&self, key: Option<&[String]>) -> Result<usize> {
        inspect::duplicate_count(&self.table, key)
    }

    /// Per-numeric-column IQR outlier counts.
    #[must_use]
    pub fn detect_outliers(&self) -> BTreeMap<String, usize> {
        inspect::outlier_counts(&self.table, OutlierRule::Iqr)
    }

    /// One combined detection pass.
    ///
    /// # Errors
    ///
    /// Propagates duplicate-detection errors.
    pub fn inspect(&self) -> Result<IssueSummary> {
        inspect::summarize(&self.table, OutlierRule::Iqr)
    }

    /// Synthesizes remediation suggestions from a fresh detection pass.
    ///
    /// Read-only. Suggestions are keyed by column name, with the literal
    /// subject `"Dataset"` for row-level defects. A column with both
    /// missing values and outliers carries both notes, in that order.
    ///
    /// # Errors
    ///
    /// Propagates duplicate-detection errors.
    pub fn diagnose(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let issues = self.inspect()?;
        let mut suggestions: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (col, count) in &issues.missing {
            if *count > 0 {
                suggestions
                    .entry(col.clone())
                    .or_default()
                    .push(format!("{count} missing values"));
            }
        }

        if issues.duplicates > 0 {
            suggestions
                .entry("Dataset".to_string())
                .or_default()
                .push(format!("{} duplicate rows", issues.duplicates));
        }

        for (col, count) in &issues.outliers {
            if *count > 0 {
                suggestions
                    .entry(col.clone())
                    .or_default()
                    .push(format!("{count} outliers detected"));
            }
        }

        Ok(suggestions)
    }

    /// Runs the enabled phases in the fixed order missing → duplicates →
    /// outliers and returns a copy of the treated table.
    ///
    /// Phases are independent and idempotent when there is nothing left
    /// to fix.
    ///
    /// # Errors
    ///
    /// Propagates the first phase error; earlier completed phases remain
    /// applied (each phase itself is atomic).
    pub fn treat(&mut self, options: &TreatOptions) -> Result<Table> {
        if options.treat_missing {
            self.fix_missing(options.missing_strategy)?;
        }
        if options.treat_duplicates {
            self.fix_duplicates(options.dedup_key.as_deref())?;
        }
        if options.treat_outliers {
            self.fix_outliers(options.outlier_strategy)?;
        }
        Ok(self.table.clone())
    }

    /// Fills missing cells column by column.
    ///
    /// Numeric columns fill with the mean or median per `strategy`
    /// (integer columns round the fill value); Utf8 columns fill with the
    /// mode, lexicographically smallest on ties, or `"Unknown"` when no
    /// mode exists; Boolean columns fill with their mode. Columns without
    /// missing cells are skipped silently; entirely-null numeric or
    /// boolean columns have no defined fill and are skipped too. One log
    /// line per filled column names the column and the fill value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedColumnType`] when a column with
    /// missing cells is outside the supported type set; the table is left
    /// unchanged and nothing is logged.
    pub fn fix_missing(&mut self, strategy: MissingStrategy) -> Result<()> {
        let batch = self.table.batch().clone();
        let schema = batch.schema();
        let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();
        let mut entries: Vec<String> = Vec::new();

        for (idx, field) in schema.fields().iter().enumerate() {
            let col = batch.column(idx);
            if col.null_count() == 0 {
                continue;
            }

            match field.data_type() {
                DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64 => {
                    let values = self.table.numeric_values(idx);
                    let Some(fill) = numeric_fill(&values, strategy) else {
                        continue;
                    };
                    let (array, rendered) = fill_numeric(col, field.data_type(), fill);
                    arrays[idx] = array;
                    entries.push(format!("Filled missing '{}' with {rendered}", field.name()));
                }
                DataType::Utf8 => {
                    let fill = string_mode(col).unwrap_or_else(|| "Unknown".to_string());
                    arrays[idx] = Arc::new(fill_string(col, &fill));
                    entries.push(format!("Filled missing '{}' with {fill}", field.name()));
                }
                DataType::Boolean => {
                    let Some(fill) = bool_mode(col) else {
                        continue;
                    };
                    arrays[idx] = Arc::new(fill_bool(col, fill));
                    entries.push(format!("Filled missing '{}' with {fill}", field.name()));
                }
                other => {
                    return Err(Error::unsupported_column_type(field.name(), other));
                }
            }
        }

        let new_batch = RecordBatch::try_new(schema, arrays).map_err(Error::Arrow)?;
        self.table.replace_batch(new_batch);
        self.fix_log.extend(entries);
        Ok(())
    }

    /// Removes rows that duplicate an earlier row, keeping the first
    /// occurrence. Whole-row equality by default; a key restricts
    /// equality to the named columns. Appends exactly one log line with
    /// the removed count, zero included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] for an unknown key column,
    /// before any mutation.
    pub fn fix_duplicates(&mut self, key: Option<&[String]>) -> Result<()> {
        let key_indices: Vec<usize> = match key {
            Some(cols) => cols
                .iter()
                .map(|name| self.table.column_index(name))
                .collect::<Result<Vec<_>>>()?,
            None => (0..self.table.num_columns()).collect(),
        };

        let num_rows = self.table.num_rows();
        let mut seen: HashSet<String> = HashSet::new();
        let mut keep: Vec<u64> = Vec::with_capacity(num_rows);

        if !key_indices.is_empty() {
            for row_idx in 0..num_rows {
                let row_key = inspect::row_key(&self.table, row_idx, &key_indices)?;
                if seen.insert(row_key) {
                    keep.push(row_idx as u64);
                }
            }
        } else {
            keep.extend(0..num_rows as u64);
        }

        let removed = num_rows - keep.len();
        if removed > 0 {
            let batch = self.table.batch().clone();
            let indices = UInt64Array::from(keep);
            let columns: Vec<ArrayRef> = batch
                .columns()
                .iter()
                .map(|col| {
                    arrow::compute::take(col.as_ref(), &indices, None).map_err(Error::Arrow)
                })
                .collect::<Result<Vec<_>>>()?;
            let new_batch =
                RecordBatch::try_new(batch.schema(), columns).map_err(Error::Arrow)?;
            self.table.replace_batch(new_batch);
        }

        self.fix_log.push(match key {
            Some(cols) => format!(
                "Removed {removed} duplicate rows based on columns {}",
                cols.join(", ")
            ),
            None => format!("Removed {removed} duplicate rows"),
        });
        Ok(())
    }

    /// Clips every numeric column to its IQR fences, recomputed from the
    /// column's current values. Values strictly below the lower fence
    /// become the fence, strictly above the upper fence likewise; integer
    /// columns clip to the fences rounded toward the interior so the
    /// column type is preserved. Appends one log line per numeric column,
    /// zero changes included.
    ///
    /// # Errors
    ///
    /// Cannot currently fail; the `Result` covers future strategies.
    pub fn fix_outliers(&mut self, strategy: OutlierStrategy) -> Result<()> {
        // Single variant today; match keeps the dispatch explicit.
        match strategy {
            OutlierStrategy::Clip => {}
        }

        let batch = self.table.batch().clone();
        let schema = batch.schema();
        let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();
        let mut entries: Vec<String> = Vec::new();

        for (idx, field) in schema.fields().iter().enumerate() {
            if !self.table.is_numeric(idx) {
                continue;
            }

            let values = self.table.numeric_values(idx);
            if let Some((lower, upper)) = inspect::bounds_for(&values, OutlierRule::Iqr) {
                arrays[idx] = clip_numeric(batch.column(idx), field.data_type(), lower, upper);
            }
            entries.push(format!("Clipped outliers in '{}'", field.name()));
        }

        let new_batch = RecordBatch::try_new(schema, arrays).map_err(Error::Arrow)?;
        self.table.replace_batch(new_batch);
        self.fix_log.extend(entries);
        Ok(())
    }

    /// The append-only audit trail of corrective actions, oldest first.
    #[must_use]
    pub fn get_fix_log(&self) -> &[String] {
        &self.fix_log
    }
}

/// Cleaners compare by table contents, like inspectors; the fix log does
/// not participate.
impl PartialEq for Cleaner {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

fn numeric_fill(values: &[f64], strategy: MissingStrategy) -> Option<f64> {
    match strategy {
        MissingStrategy::Mean => stats::mean(values),
        MissingStrategy::Median => stats::median(&stats::sorted(values.to_vec())),
    }
}

/// Fills a numeric array's nulls with `fill`, rounding for integer
/// types. Returns the new array and the fill value as logged.
fn fill_numeric(col: &ArrayRef, data_type: &DataType, fill: f64) -> (ArrayRef, String) {
    match data_type {
        DataType::Int32 => {
            let v = fill.round() as i32;
            (Arc::new(fill_int32(col, v)) as ArrayRef, v.to_string())
        }
        DataType::Int64 => {
            let v = fill.round() as i64;
            (Arc::new(fill_int64(col, v)) as ArrayRef, v.to_string())
        }
        DataType::Float32 => {
            let v = fill as f32;
            (Arc::new(fill_float32(col, v)) as ArrayRef, v.to_string())
        }
        _ => (Arc::new(fill_float64(col, fill)) as ArrayRef, fill.to_string()),
    }
}

fn fill_int32(col: &ArrayRef, fill: i32) -> Int32Array {
    let Some(arr) = col.as_any().downcast_ref::<Int32Array>() else {
        return Int32Array::from(Vec::<i32>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

fn fill_int64(col: &ArrayRef, fill: i64) -> Int64Array {
    let Some(arr) = col.as_any().downcast_ref::<Int64Array>() else {
        return Int64Array::from(Vec::<i64>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

fn fill_float32(col: &ArrayRef, fill: f32) -> Float32Array {
    let Some(arr) = col.as_any().downcast_ref::<Float32Array>() else {
        return Float32Array::from(Vec::<f32>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

fn fill_float64(col: &ArrayRef, fill: f64) -> Float64Array {
    let Some(arr) = col.as_any().downcast_ref::<Float64Array>() else {
        return Float64Array::from(Vec::<f64>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

fn fill_string(col: &ArrayRef, fill: &str) -> StringArray {
    let Some(arr) = col.as_any().downcast_ref::<StringArray>() else {
        return StringArray::from(Vec::<&str>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

fn fill_bool(col: &ArrayRef, fill: bool) -> BooleanArray {
    let Some(arr) = col.as_any().downcast_ref::<BooleanArray>() else {
        return BooleanArray::from(Vec::<bool>::new());
    };
    (0..arr.len())
        .map(|i| if arr.is_null(i) { fill } else { arr.value(i) })
        .collect::<Vec<_>>()
        .into()
}

/// Most frequent non-null string, lexicographically smallest on ties.
/// `None` when the column has no non-null values.
fn string_mode(col: &ArrayRef) -> Option<String> {
    let arr = col.as_any().downcast_ref::<StringArray>()?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for i in 0..arr.len() {
        if !arr.is_null(i) {
            *counts.entry(arr.value(i)).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then(b_val.cmp(a_val))
        })
        .map(|(value, _)| value.to_string())
}

/// Most frequent non-null boolean, `false` winning ties. `None` when
/// the column has no non-null values.
fn bool_mode(col: &ArrayRef) -> Option<bool> {
    let arr = col.as_any().downcast_ref::<BooleanArray>()?;
    let mut trues = 0usize;
    let mut falses = 0usize;
    for i in 0..arr.len() {
        if !arr.is_null(i) {
            if arr.value(i) {
                trues += 1;
            } else {
                falses += 1;
            }
        }
    }
    if trues + falses == 0 {
        None
    } else {
        Some(trues > falses)
    }
}

/// Clips a numeric array to `[lower, upper]`, preserving nulls. Integer
/// types use the fences rounded toward the interior.
fn clip_numeric(col: &ArrayRef, data_type: &DataType, lower: f64, upper: f64) -> ArrayRef {
    match data_type {
        DataType::Int32 => {
            let lo = lower.ceil() as i32;
            let hi = upper.floor() as i32;
            let arr = col.as_any().downcast_ref::<Int32Array>();
            let Some(arr) = arr else {
                return Arc::clone(col);
            };
            let values: Vec<Option<i32>> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        let v = arr.value(i);
                        if f64::from(v) < lower {
                            Some(lo)
                        } else if f64::from(v) > upper {
                            Some(hi)
                        } else {
                            Some(v)
                        }
                    }
                })
                .collect();
            Arc::new(Int32Array::from(values))
        }
        DataType::Int64 => {
            let lo = lower.ceil() as i64;
            let hi = upper.floor() as i64;
            let arr = col.as_any().downcast_ref::<Int64Array>();
            let Some(arr) = arr else {
                return Arc::clone(col);
            };
            let values: Vec<Option<i64>> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        let v = arr.value(i);
                        if (v as f64) < lower {
                            Some(lo)
                        } else if (v as f64) > upper {
                            Some(hi)
                        } else {
                            Some(v)
                        }
                    }
                })
                .collect();
            Arc::new(Int64Array::from(values))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>();
            let Some(arr) = arr else {
                return Arc::clone(col);
            };
            let values: Vec<Option<f32>> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        let v = f64::from(arr.value(i));
                        Some(v.clamp(lower, upper) as f32)
                    }
                })
                .collect();
            Arc::new(Float32Array::from(values))
        }
        _ => {
            let arr = col.as_any().downcast_ref::<Float64Array>();
            let Some(arr) = arr else {
                return Arc::clone(col);
            };
            let values: Vec<Option<f64>> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        let v = arr.value(i);
                        if v < lower {
                            Some(lower)
                        } else if v > upper {
                            Some(upper)
                        } else {
                            Some(v)
                        }
                    }
                })
                .collect();
            Arc::new(Float64Array::from(values))
        }
    }
}

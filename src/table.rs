//! The Table value type for remediar.
//!
//! A [`Table`] is the in-memory tabular value every engine component
//! operates on: ordered named columns backed by a single Arrow
//! `RecordBatch`. Tables have value semantics — each component copies its
//! Table on construction, and mutation replaces the inner batch, so a
//! change made by one holder is never observable through another.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
        RecordBatch, StringArray,
    },
    datatypes::{DataType, SchemaRef},
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};

/// A single typed cell read out of a [`Table`].
///
/// Covers the Arrow column types the engine mutates: Int32/Int64 map to
/// `Int`, Float32/Float64 to `Float`, Utf8 to `Text`, Boolean to `Bool`.
/// Null cells are `Null` regardless of column type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent value (Arrow validity bitmap).
    Null,
    /// Integer value (Int32 widened to i64).
    Int(i64),
    /// Floating-point value (Float32 widened to f64).
    Float(f64),
    /// String value.
    Text(String),
    /// Boolean value.
    Bool(bool),
}

impl CellValue {
    /// Returns true for the absent sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell, if it holds a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total ordering used by row sorting: values ascend, nulls sort last.
    ///
    /// Floats order by `total_cmp`, so NaN has a defined (greatest finite)
    /// position instead of poisoning the sort.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (a, b) => Self::rank(a).cmp(&Self::rank(b)),
        }
    }

    /// Key fragment for row-equality hashing.
    ///
    /// Floats key by bit pattern for exact comparison; nulls share one
    /// sentinel so null == null for duplicate detection.
    #[must_use]
    pub fn key_fragment(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_bits().to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }

    fn rank(value: &Self) -> u8 {
        match value {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Text(_) => 2,
            Self::Null => 3,
        }
    }
}

/// An in-memory table of ordered named columns with equal row counts.
///
/// # Example
///
/// ```no_run
/// use remediar::Table;
///
/// let table = Table::from_csv("data.csv").unwrap();
/// println!("{} rows, {} columns", table.num_rows(), table.num_columns());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Creates a Table from a single RecordBatch.
    #[must_use]
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Creates a Table by concatenating RecordBatches of one schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the batches vector is empty or the batches have
    /// inconsistent schemas.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::EmptyTable);
        };
        let schema = first.schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {i} has different schema than batch 0"
                )));
            }
        }

        let batch = arrow::compute::concat_batches(&schema, &batches).map_err(Error::Arrow)?;
        Ok(Self { batch })
    }

    /// Loads a Table from a CSV file with a header row, inferring the
    /// schema from the first 1000 records. Empty cells ingest as nulls.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid CSV, or
    /// contains no data.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(&mut buf_reader, Some(1000))
            .map_err(Error::Arrow)?;

        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(e, path))?;

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_header(true)
            .build(buf_reader)
            .map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Loads a Table from a JSON Lines file, one JSON object per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed, or
    /// contains no data.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::BufReader;

        use arrow_json::ReaderBuilder;

        let path = path.as_ref();

        let infer_file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let infer_reader = BufReader::new(infer_file);
        let (inferred, _) = arrow_json::reader::infer_json_schema(infer_reader, Some(1000))
            .map_err(Error::Arrow)?;

        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let buf_reader = BufReader::new(file);

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .build(buf_reader)
            .map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Loads a Table from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid
    /// Parquet, or contains no data.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(Error::Parquet)?;
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Loads a Table from a file, dispatching on its extension
    /// (csv, json/jsonl, parquet).
    ///
    /// # Errors
    ///
    /// Returns an error for unrecognized extensions or on read failure.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::from_csv(path),
            Some("json" | "jsonl") => Self::from_json(path),
            Some("parquet") => Self::from_parquet(path),
            other => Err(Error::InvalidFormat(format!(
                "unrecognized extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    /// The underlying RecordBatch.
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// The table schema.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Index of the named column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .column_with_name(name)
            .map(|(idx, _)| idx)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// The named column's array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        let idx = self.column_index(name)?;
        Ok(self.batch.column(idx))
    }

    /// True if the column at `col_idx` holds a numeric type the engine
    /// can detect over and mutate (Int32/Int64/Float32/Float64).
    #[must_use]
    pub fn is_numeric(&self, col_idx: usize) -> bool {
        matches!(
            self.batch.schema().field(col_idx).data_type(),
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
        )
    }

    /// Reads one cell as a typed [`CellValue`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedColumnType`] for column types outside
    /// the supported set.
    pub fn cell(&self, col_idx: usize, row_idx: usize) -> Result<CellValue> {
        let col = self.batch.column(col_idx);
        if col.is_null(row_idx) {
            return Ok(CellValue::Null);
        }

        let value = if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
            CellValue::Int(i64::from(arr.value(row_idx)))
        } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
            CellValue::Int(arr.value(row_idx))
        } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
            CellValue::Float(f64::from(arr.value(row_idx)))
        } else if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
            CellValue::Float(arr.value(row_idx))
        } else if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
            CellValue::Text(arr.value(row_idx).to_string())
        } else if let Some(arr) = col.as_any().downcast_ref::<BooleanArray>() {
            CellValue::Bool(arr.value(row_idx))
        } else {
            let field = self.batch.schema().field(col_idx).clone();
            return Err(Error::unsupported_column_type(
                field.name(),
                field.data_type(),
            ));
        };

        Ok(value)
    }

    /// Non-null finite values of a numeric column as f64, in row order.
    ///
    /// Returns an empty vector for non-numeric columns.
    pub(crate) fn numeric_values(&self, col_idx: usize) -> Vec<f64> {
        let col = self.batch.column(col_idx);
        let mut values = Vec::with_capacity(col.len() - col.null_count());

        #[allow(clippy::cast_precision_loss)]
        for i in 0..col.len() {
            if col.is_null(i) {
                continue;
            }
            let v = if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
                f64::from(arr.value(i))
            } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
                arr.value(i) as f64
            } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
                f64::from(arr.value(i))
            } else if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
                arr.value(i)
            } else {
                return Vec::new();
            };
            if v.is_finite() {
                values.push(v);
            }
        }

        values
    }

    /// Replaces the backing batch. Mutation is visible only through this
    /// Table value, never through previously taken copies.
    pub(crate) fn replace_batch(&mut self, batch: RecordBatch) {
        self.batch = batch;
    }
}

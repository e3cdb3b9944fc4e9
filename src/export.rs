//! Export of treated tables.
//!
//! The [`Exporter`] consumes the post-treatment Table unchanged and
//! serializes it: CSV with a header row and no index column, Parquet, or
//! record-oriented JSON Lines. Formats are opaque to the engine core.

use std::path::Path;

use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{
    error::{Error, Result},
    table::Table,
};

/// Writes a Table to CSV, Parquet, or JSON Lines files.
///
/// # Example
///
/// ```no_run
/// use remediar::{Exporter, Table};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// Exporter::new(table).write("cleaned.parquet").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    table: Table,
}

impl Exporter {
    /// Creates an exporter over its own copy of the table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// The exported table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Writes the table to a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        use arrow_csv::WriterBuilder;

        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(self.table.batch()).map_err(Error::Arrow)?;
        Ok(())
    }

    /// Writes the table to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, self.table.schema(), Some(props))
            .map_err(Error::Parquet)?;
        writer.write(self.table.batch()).map_err(Error::Parquet)?;
        writer.close().map_err(Error::Parquet)?;
        Ok(())
    }

    /// Writes the table to a JSON Lines file, one object per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        use std::io::BufWriter;

        use arrow_json::LineDelimitedWriter;

        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;
        let buf_writer = BufWriter::new(file);

        let mut writer = LineDelimitedWriter::new(buf_writer);
        writer.write(self.table.batch()).map_err(Error::Arrow)?;
        writer.finish().map_err(Error::Arrow)?;
        Ok(())
    }

    /// Writes the table to `path`, dispatching on its extension
    /// (csv, json/jsonl, parquet).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for unrecognized extensions, plus
    /// any write failure.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => self.to_csv(path),
            Some("json" | "jsonl") => self.to_json(path),
            Some("parquet") => self.to_parquet(path),
            other => Err(Error::InvalidFormat(format!(
                "unrecognized extension {other:?} for {}",
                path.display()
            ))),
        }
    }
}

//! Table organization: column and row ordering.
//!
//! The [`Organizer`] owns a Table copy and reorders it in place, returning
//! the owned Table for chaining. Sorts are stable: equal keys keep their
//! relative order.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, RecordBatch, UInt64Array},
    datatypes::Schema,
};

use crate::{
    error::{Error, Result},
    table::{CellValue, Table},
};

/// Sorts a Table's columns by name or its rows by one column's values.
///
/// # Example
///
/// ```no_run
/// use remediar::{Organizer, Table};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// let mut organizer = Organizer::new(table);
/// organizer.sort_columns();
/// let sorted = organizer.sort_rows("age").unwrap();
/// println!("{} rows", sorted.num_rows());
/// ```
#[derive(Debug, Clone)]
pub struct Organizer {
    table: Table,
}

impl Organizer {
    /// Creates an organizer over its own copy of the table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// The current (possibly reordered) table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of rows in the current table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Reorders columns lexicographically by name. Rows are untouched.
    /// Idempotent: sorting a sorted table changes nothing.
    pub fn sort_columns(&mut self) -> &Table {
        let batch = self.table.batch().clone();
        let schema = batch.schema();

        let mut order: Vec<usize> = (0..schema.fields().len()).collect();
        order.sort_by(|&a, &b| schema.field(a).name().cmp(schema.field(b).name()));

        let fields: Vec<_> = order
            .iter()
            .map(|&idx| schema.field(idx).clone())
            .collect();
        let arrays: Vec<ArrayRef> = order
            .iter()
            .map(|&idx| Arc::clone(batch.column(idx)))
            .collect();

        // Same arrays, new order: try_new cannot fail here.
        if let Ok(new_batch) = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays) {
            self.table.replace_batch(new_batch);
        }
        &self.table
    }

    /// Stable-sorts rows ascending by the named column's values, nulls
    /// last. Column order is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] when the column is absent and
    /// [`Error::UnsupportedColumnType`] when its cells cannot be read;
    /// the table is left unchanged either way.
    pub fn sort_rows(&mut self, column_name: &str) -> Result<&Table> {
        let col_idx = self.table.column_index(column_name)?;

        let mut keys: Vec<(CellValue, u64)> = Vec::with_capacity(self.table.num_rows());
        for row_idx in 0..self.table.num_rows() {
            keys.push((self.table.cell(col_idx, row_idx)?, row_idx as u64));
        }
        keys.sort_by(|(a, _), (b, _)| a.compare(b));

        let indices = UInt64Array::from(keys.into_iter().map(|(_, i)| i).collect::<Vec<_>>());
        let batch = self.table.batch().clone();
        let columns: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(|col| arrow::compute::take(col.as_ref(), &indices, None).map_err(Error::Arrow))
            .collect::<Result<Vec<_>>>()?;

        let new_batch = RecordBatch::try_new(batch.schema(), columns).map_err(Error::Arrow)?;
        self.table.replace_batch(new_batch);
        Ok(&self.table)
    }
}

/// Organizers compare by current table contents.
impl PartialEq for Organizer {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

//! Error types for remediar.

use std::path::PathBuf;

/// Result type alias for remediar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in remediar operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error during file operations.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Column not found in schema.
    #[error("Column '{name}' not found in schema")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Unrecognized remediation strategy name.
    #[error("Invalid strategy '{value}': expected one of {expected}")]
    InvalidStrategy {
        /// The strategy name that failed to parse.
        value: String,
        /// The accepted strategy names.
        expected: &'static str,
    },

    /// Column type not supported by the requested operation.
    #[error("Column '{column}' has unsupported type {data_type} for this operation")]
    UnsupportedColumnType {
        /// The offending column.
        column: String,
        /// Its Arrow data type, rendered.
        data_type: String,
    },

    /// Schema mismatch between record batches.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// Unrecognized output format or file extension.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Source table contained no record batches.
    #[error("Table is empty")]
    EmptyTable,
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid strategy error.
    pub fn invalid_strategy(value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidStrategy {
            value: value.into(),
            expected,
        }
    }

    /// Create an unsupported column type error.
    pub fn unsupported_column_type(
        column: impl Into<String>,
        data_type: &arrow::datatypes::DataType,
    ) -> Self {
        Self::UnsupportedColumnType {
            column: column.into(),
            data_type: format!("{data_type:?}"),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}

//! remediar - Tabular Data-Quality Remediation in Pure Rust
//!
//! Detects data-quality defects in an in-memory table (missing values,
//! duplicate rows, statistical outliers), applies remediation strategies
//! (imputation, deduplication, clipping), logs every corrective action,
//! and produces a post-remediation quality report.
//!
//! # Design Principles
//!
//! 1. **Value semantics** - every component copies its Table on
//!    construction; mutation is never observable through another holder
//! 2. **Pure Rust** - no Python, no FFI
//! 3. **Zero-copy** - Arrow `RecordBatch` throughout
//! 4. **Two outlier rules by design** - IQR for remediation, z-score for
//!    reporting; they are named, not unified
//!
//! # Quick Start
//!
//! ```no_run
//! use remediar::{Cleaner, Table, TreatOptions};
//!
//! // Load a CSV file
//! let table = Table::from_csv("data/users.csv").unwrap();
//!
//! // Diagnose, then treat
//! let mut cleaner = Cleaner::new(table);
//! for (subject, notes) in cleaner.diagnose().unwrap() {
//!     println!("{subject}: {notes:?}");
//! }
//! let cleaned = cleaner.treat(&TreatOptions::new()).unwrap();
//!
//! // Audit what happened
//! for entry in cleaner.get_fix_log() {
//!     println!("- {entry}");
//! }
//! println!("{} rows remain", cleaned.num_rows());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

pub mod clean;
/// CLI module for command-line interface
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod export;
pub mod inspect;
pub mod organize;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use clean::{Cleaner, MissingStrategy, OutlierStrategy, TreatOptions};
pub use error::{Error, Result};
pub use export::Exporter;
pub use inspect::{Inspector, IssueSummary, OutlierRule};
pub use organize::Organizer;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use report::ReportGenerator;
pub use table::{CellValue, Table};

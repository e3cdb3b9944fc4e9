//! Post-remediation quality reporting.
//!
//! The [`ReportGenerator`] shares missing/duplicate detection with the
//! inspector but applies the 3-sigma z-score outlier rule instead of IQR.
//! The two rules diverge on purpose — IQR decides what the cleaner
//! remediates, z-score is the reporting convention — and must not be
//! unified.

use std::path::Path;

use crate::{
    error::{Error, Result},
    inspect::{self, IssueSummary, OutlierRule},
    table::Table,
};

/// Generates issue reports and a derived health score over its owned
/// Table copy.
///
/// Reports are recomputed fresh on every call; nothing is cached across
/// table mutations (the generator's copy never mutates, but callers may
/// construct a new generator from a treated table at any time).
///
/// # Example
///
/// ```no_run
/// use remediar::{ReportGenerator, Table};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// let mut reporter = ReportGenerator::new(table);
/// let summary = reporter.report().unwrap();
/// println!("{summary}");
/// println!("health: {}", reporter.health_score().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    table: Table,
    last: Option<IssueSummary>,
}

impl ReportGenerator {
    /// Creates a report generator over its own copy of the table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self { table, last: None }
    }

    /// The reported table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Runs a fresh detection pass: missing and duplicate detection as in
    /// the inspector, outliers by the z-score rule (strictly more than 3
    /// sample standard deviations from the column mean; columns with
    /// fewer than two finite values count zero).
    ///
    /// # Errors
    ///
    /// Propagates duplicate-detection errors.
    pub fn report(&mut self) -> Result<IssueSummary> {
        let summary = inspect::summarize(&self.table, OutlierRule::ZScore)?;
        self.last = Some(summary.clone());
        Ok(summary)
    }

    /// Health score in `[0, 100]`: `100 - total defects`, saturating at
    /// zero, from the most recent report. Runs a report implicitly if
    /// none has run yet.
    ///
    /// # Errors
    ///
    /// Propagates report errors.
    #[allow(clippy::cast_possible_truncation)]
    pub fn health_score(&mut self) -> Result<u8> {
        let summary = match &self.last {
            Some(summary) => summary.clone(),
            None => self.report()?,
        };
        let total = summary.total_defects() as u64;
        let score = 100u64.saturating_sub(total) as u8;
        Ok(score)
    }

    /// Plain-text rendering of the most recent report (running one if
    /// needed): one upper-cased section per top-level key with a blank
    /// line between sections.
    ///
    /// # Errors
    ///
    /// Propagates report errors.
    pub fn render(&mut self) -> Result<String> {
        let summary = match &self.last {
            Some(summary) => summary.clone(),
            None => self.report()?,
        };
        Ok(summary.to_string())
    }

    /// Writes the plain-text rendering to a file.
    ///
    /// # Errors
    ///
    /// Propagates report errors and I/O failures.
    pub fn export_report(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.render()?;
        std::fs::write(path, text).map_err(|e| Error::io(e, path))
    }
}

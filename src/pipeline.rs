//! Orchestration of the remediation sequence.
//!
//! The [`Pipeline`] holds no detection or remediation logic of its own; it
//! fixes the call order: diagnose (read-only) → treat (mutating) → fix-log
//! retrieval → export and report over the treated table only. The outcome
//! is returned as a value for the caller (the CLI) to render.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    clean::{Cleaner, TreatOptions},
    error::Result,
    export::Exporter,
    inspect::IssueSummary,
    report::ReportGenerator,
    table::Table,
};

/// Everything one pipeline run surfaced, in execution order.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Pre-treatment diagnosis, keyed by column or `"Dataset"`.
    pub suggestions: BTreeMap<String, Vec<String>>,
    /// The cleaner's audit trail after treatment.
    pub fix_log: Vec<String>,
    /// The treated table.
    pub cleaned: Table,
    /// Post-treatment issue report, when reporting was requested.
    pub summary: Option<IssueSummary>,
    /// Post-treatment health score, when reporting was requested.
    pub health_score: Option<u8>,
}

/// Runs the fixed remediation sequence over one [`Cleaner`].
///
/// # Example
///
/// ```no_run
/// use remediar::{Cleaner, Pipeline, Table};
///
/// let table = Table::from_csv("data.csv").unwrap();
/// let outcome = Pipeline::new(Cleaner::new(table))
///     .export_to("cleaned.csv")
///     .report_to("report.txt")
///     .run()
///     .unwrap();
/// println!("{} fixes applied", outcome.fix_log.len());
/// ```
#[derive(Debug)]
pub struct Pipeline {
    cleaner: Cleaner,
    options: TreatOptions,
    export_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    with_report: bool,
}

impl Pipeline {
    /// Creates a pipeline around a cleaner with default treatment
    /// options and no collaborators.
    #[must_use]
    pub fn new(cleaner: Cleaner) -> Self {
        Self {
            cleaner,
            options: TreatOptions::default(),
            export_path: None,
            report_path: None,
            with_report: false,
        }
    }

    /// Sets the treatment options.
    #[must_use]
    pub fn with_options(mut self, options: TreatOptions) -> Self {
        self.options = options;
        self
    }

    /// Exports the treated table to `path` (extension selects the
    /// format) after treatment completes.
    #[must_use]
    pub fn export_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    /// Generates a post-treatment report and writes its text rendering
    /// to `path`.
    #[must_use]
    pub fn report_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self.with_report = true;
        self
    }

    /// Generates a post-treatment report without writing a file.
    #[must_use]
    pub fn with_report(mut self, enabled: bool) -> Self {
        self.with_report = enabled;
        self
    }

    /// Runs the sequence: diagnose, treat, collect the fix log, then
    /// export and report over the treated table.
    ///
    /// # Errors
    ///
    /// Propagates the first failing step's error.
    pub fn run(&mut self) -> Result<PipelineOutcome> {
        let suggestions = self.cleaner.diagnose()?;
        let cleaned = self.cleaner.treat(&self.options)?;
        let fix_log = self.cleaner.get_fix_log().to_vec();

        if let Some(path) = &self.export_path {
            Exporter::new(cleaned.clone()).write(path)?;
        }

        let (summary, health_score) = if self.with_report {
            let mut reporter = ReportGenerator::new(cleaned.clone());
            let summary = reporter.report()?;
            let score = reporter.health_score()?;
            if let Some(path) = &self.report_path {
                reporter.export_report(path)?;
            }
            (Some(summary), Some(score))
        } else {
            (None, None)
        };

        Ok(PipelineOutcome {
            suggestions,
            fix_log,
            cleaned,
            summary,
            health_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Array, Float64Array, RecordBatch, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;

    fn dirty_table() -> Table {
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
    fn test_run_sequences_diagnose_treat_log() {
        let mut pipeline = Pipeline::new(Cleaner::new(dirty_table())).with_report(true);
        let outcome = pipeline.run().unwrap();

        // Diagnosis reflects the pre-treatment table.
        assert!(outcome.suggestions.contains_key("age"));
        // Treatment ran all three phases.
        assert_eq!(outcome.fix_log.len(), 3);
        // The report sees the treated table: no missing values left.
        let summary = outcome.summary.unwrap();
        assert_eq!(summary.missing["age"], 0);
        assert!(outcome.health_score.is_some());
    }

    #[test]
    fn test_run_without_report() {
        let mut pipeline = Pipeline::new(Cleaner::new(dirty_table()));
        let outcome = pipeline.run().unwrap();
        assert!(outcome.summary.is_none());
        assert!(outcome.health_score.is_none());
    }

    #[test]
    fn test_run_exports_treated_table() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cleaned.csv");
        let report = dir.path().join("report.txt");

        let mut pipeline = Pipeline::new(Cleaner::new(dirty_table()))
            .export_to(&out)
            .report_to(&report);
        let outcome = pipeline.run().unwrap();

        let exported = Table::from_csv(&out).unwrap();
        assert_eq!(exported.num_rows(), outcome.cleaned.num_rows());
        // Exported data is post-treatment: the null was filled.
        assert_eq!(exported.column("age").unwrap().null_count(), 0);

        let text = std::fs::read_to_string(&report).unwrap();
        assert!(text.contains("MISSING:"));
    }

    #[test]
    fn test_run_respects_options() {
        let options = TreatOptions::new()
            .with_missing(false)
            .with_outliers(false);
        let mut pipeline = Pipeline::new(Cleaner::new(dirty_table())).with_options(options);
        let outcome = pipeline.run().unwrap();
        assert_eq!(outcome.fix_log, vec!["Removed 0 duplicate rows".to_string()]);
    }
}

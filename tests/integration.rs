//! Integration tests for remediar.

#![allow(clippy::float_cmp, clippy::uninlined_format_args)]

use std::sync::Arc;

use arrow::{
    array::{Array, Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use remediar::{
    Cleaner, Exporter, Inspector, MissingStrategy, Organizer, Pipeline, ReportGenerator, Table,
    TreatOptions,
};

/// The concrete remediation scenario: one numeric column with a null and
/// an extreme value, one text column with a repeated value.
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

fn age_values(table: &Table) -> Vec<Option<f64>> {
    let col = table.column("age").unwrap();
    let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
    (0..arr.len())
        .map(|i| (!arr.is_null(i)).then(|| arr.value(i)))
        .collect()
}

#[test]
fn test_detection_scenario() {
    let inspector = Inspector::new(age_name_table());

    let missing = inspector.detect_missing();
    assert_eq!(missing["age"], 1);
    assert_eq!(missing["name"], 0);

    assert_eq!(inspector.detect_duplicates(None).unwrap(), 0);

    let outliers = inspector.detect_outliers();
    assert_eq!(outliers["age"], 1);
    assert!(!outliers.contains_key("name"));
}

#[test]
fn test_remediation_scenario_end_to_end() {
    let mut cleaner = Cleaner::new(age_name_table());

    cleaner.fix_missing(MissingStrategy::Mean).unwrap();
    // The null fills with the mean of the four present values, the
    // extreme 1000 included.
    assert_eq!(age_values(cleaner.table())[4], Some(268.75));
    assert_eq!(cleaner.detect_missing()["age"], 0);

    cleaner
        .fix_outliers(remediar::OutlierStrategy::Clip)
        .unwrap();
    // 1000 clips to the upper fence computed over the filled column.
    assert_eq!(age_values(cleaner.table())[2], Some(634.375));

    let log = cleaner.get_fix_log();
    assert_eq!(log.len(), 2);
    assert!(log[0].contains("age") && log[0].starts_with("Filled"));
    assert!(log[1].contains("age") && log[1].starts_with("Clipped"));
}

#[test]
fn test_fix_log_grows_monotonically() {
    let mut cleaner = Cleaner::new(age_name_table());
    cleaner.treat(&TreatOptions::new()).unwrap();
    let first_len = cleaner.get_fix_log().len();
    let first: Vec<String> = cleaner.get_fix_log().to_vec();

    cleaner.treat(&TreatOptions::new()).unwrap();
    let log = cleaner.get_fix_log();
    assert!(log.len() > first_len);
    // Earlier entries are untouched and in place.
    assert_eq!(&log[..first_len], first.as_slice());
}

#[test]
fn test_treat_with_keyed_dedup() {
    let options = TreatOptions::new().dedup_key(vec!["name".to_string()]);
    let mut cleaner = Cleaner::new(age_name_table());
    let cleaned = cleaner.treat(&options).unwrap();
    // The second "A" row is gone.
    assert_eq!(cleaned.num_rows(), 4);
}

#[test]
fn test_mutation_is_not_observable_through_copies() {
    let table = age_name_table();
    let inspector = Inspector::new(table.clone());

    let mut cleaner = Cleaner::new(table);
    cleaner.treat(&TreatOptions::new()).unwrap();

    // The inspector's copy still sees the original defects.
    assert_eq!(inspector.detect_missing()["age"], 1);
}

#[test]
fn test_organizer_chain() {
    let mut organizer = Organizer::new(age_name_table());
    organizer.sort_columns();
    let sorted = organizer.sort_rows("age").unwrap();

    assert_eq!(sorted.column_names(), vec!["age", "name"]);
    let ages = age_values(sorted);
    assert_eq!(ages[0], Some(24.0));
    // The null row sorts last.
    assert_eq!(ages[4], None);
}

#[test]
fn test_report_after_treatment() {
    let mut cleaner = Cleaner::new(age_name_table());
    let cleaned = cleaner.treat(&TreatOptions::new()).unwrap();

    let mut reporter = ReportGenerator::new(cleaned);
    let summary = reporter.report().unwrap();
    assert_eq!(summary.missing["age"], 0);
    assert_eq!(summary.duplicates, 0);
    // Five values cannot sit more than 3 sample deviations out.
    assert_eq!(summary.outliers["age"], 0);
    assert_eq!(reporter.health_score().unwrap(), 100);
}

#[test]
fn test_pipeline_end_to_end_with_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("cleaned.csv");
    let report = dir.path().join("report.txt");

    Exporter::new(age_name_table()).to_csv(&input).unwrap();

    let table = Table::from_csv(&input).unwrap();
    let mut pipeline = Pipeline::new(Cleaner::new(table))
        .export_to(&output)
        .report_to(&report);
    let outcome = pipeline.run().unwrap();

    assert!(outcome.suggestions.contains_key("age"));
    assert_eq!(outcome.fix_log.len(), 3);
    assert_eq!(outcome.health_score, Some(100));

    let cleaned = Table::from_csv(&output).unwrap();
    assert_eq!(cleaned.column("age").unwrap().null_count(), 0);

    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.contains("MISSING:"));
    assert!(text.contains("DUPLICATES:"));
    assert!(text.contains("OUTLIERS:"));
}

#[test]
fn test_csv_ingestion_reads_empty_cells_as_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaps.csv");
    std::fs::write(&path, "id,score\n1,10.5\n2,\n3,7.25\n").unwrap();

    let table = Table::from_csv(&path).unwrap();
    let inspector = Inspector::new(table);
    assert_eq!(inspector.detect_missing()["score"], 1);
}

#[test]
fn test_parquet_round_trip_preserves_treatment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleaned.parquet");

    let mut cleaner = Cleaner::new(age_name_table());
    let cleaned = cleaner.treat(&TreatOptions::new()).unwrap();
    Exporter::new(cleaned.clone()).to_parquet(&path).unwrap();

    let loaded = Table::from_parquet(&path).unwrap();
    assert_eq!(loaded, cleaned);
}

#[test]
fn test_zero_defect_table_scores_100_and_logs_zero_actions() {
    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(Int64Array::from(vec![1, 2, 3, 4]))],
    )
    .unwrap();
    let table = Table::from_batch(batch);

    let mut reporter = ReportGenerator::new(table.clone());
    assert_eq!(reporter.health_score().unwrap(), 100);

    let mut cleaner = Cleaner::new(table);
    assert!(cleaner.diagnose().unwrap().is_empty());
    cleaner.treat(&TreatOptions::new()).unwrap();
    // Duplicate and outlier phases log their zero-count actions; the
    // missing phase skips silently.
    assert_eq!(
        cleaner.get_fix_log(),
        &[
            "Removed 0 duplicate rows".to_string(),
            "Clipped outliers in 'n'".to_string(),
        ]
    );
}

//! remediar CLI - command-line interface for the remediation engine.
//!
//! All user-facing text lives here; library modules never print.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    clean::{Cleaner, MissingStrategy, OutlierStrategy, TreatOptions},
    error::Result,
    export::Exporter,
    inspect::Inspector,
    organize::Organizer,
    pipeline::Pipeline,
    report::ReportGenerator,
    table::Table,
};

/// remediar - tabular data-quality remediation in pure Rust
#[derive(Parser)]
#[command(name = "remediar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect missing values, duplicate rows, and outliers
    Inspect {
        /// Path to the table file (csv, jsonl, parquet)
        path: PathBuf,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Suggest remediations for detected defects
    Diagnose {
        /// Path to the table file
        path: PathBuf,
    },
    /// Treat defects and export the cleaned table
    Clean {
        /// Path to the table file
        path: PathBuf,
        /// Output file; extension selects the format
        #[arg(short, long)]
        output: PathBuf,
        /// Skip the missing-value phase
        #[arg(long)]
        skip_missing: bool,
        /// Skip the duplicate-row phase
        #[arg(long)]
        skip_duplicates: bool,
        /// Skip the outlier phase
        #[arg(long)]
        skip_outliers: bool,
        /// Numeric fill strategy (mean, median)
        #[arg(long, default_value = "mean")]
        missing_strategy: MissingStrategy,
        /// Outlier strategy (clip)
        #[arg(long, default_value = "clip")]
        outlier_strategy: OutlierStrategy,
        /// Comma-separated key columns for deduplication (whole-row when
        /// omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Sort columns by name and/or rows by a column
    Sort {
        /// Path to the table file
        path: PathBuf,
        /// Output file; extension selects the format
        #[arg(short, long)]
        output: PathBuf,
        /// Sort rows ascending by this column
        #[arg(long)]
        by: Option<String>,
        /// Sort columns lexicographically by name
        #[arg(long)]
        columns: bool,
    },
    /// Post-remediation issue report and health score
    Report {
        /// Path to the table file
        path: PathBuf,
        /// Write the plain-text report here as well
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Full pipeline: diagnose, treat, export, report
    Run {
        /// Path to the table file
        path: PathBuf,
        /// Output file for the cleaned table
        #[arg(short, long)]
        output: PathBuf,
        /// Write a plain-text report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Executes a parsed CLI invocation.
///
/// # Errors
///
/// Propagates the failing command's error for the binary to render.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect { path, format } => cmd_inspect(&path, &format),
        Commands::Diagnose { path } => cmd_diagnose(&path),
        Commands::Clean {
            path,
            output,
            skip_missing,
            skip_duplicates,
            skip_outliers,
            missing_strategy,
            outlier_strategy,
            key,
        } => {
            let mut options = TreatOptions::new()
                .with_missing(!skip_missing)
                .with_duplicates(!skip_duplicates)
                .with_outliers(!skip_outliers)
                .missing_strategy(missing_strategy)
                .outlier_strategy(outlier_strategy);
            if let Some(key) = key {
                options =
                    options.dedup_key(key.split(',').map(|s| s.trim().to_string()).collect());
            }
            cmd_clean(&path, &output, &options)
        }
        Commands::Sort {
            path,
            output,
            by,
            columns,
        } => cmd_sort(&path, &output, by.as_deref(), columns),
        Commands::Report { path, output, json } => cmd_report(&path, output.as_deref(), json),
        Commands::Run {
            path,
            output,
            report,
        } => cmd_run(&path, &output, report),
    }
}

fn cmd_inspect(path: &PathBuf, format: &str) -> Result<()> {
    let table = Table::from_path(path)?;
    let inspector = Inspector::new(table);
    let summary = inspector.inspect()?;

    if format == "json" {
        let json = serde_json::json!({
            "path": path.display().to_string(),
            "rows": inspector.num_rows(),
            "summary": summary,
            "total_defects": summary.total_defects(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json)
                .map_err(|e| crate::Error::InvalidFormat(e.to_string()))?
        );
    } else {
        println!("Issue Summary");
        println!("=============");
        println!("File: {}", path.display());
        println!("Rows: {}", inspector.num_rows());
        println!();
        print!("{summary}");
    }
    Ok(())
}

fn cmd_diagnose(path: &PathBuf) -> Result<()> {
    let table = Table::from_path(path)?;
    let cleaner = Cleaner::new(table);
    let suggestions = cleaner.diagnose()?;

    if suggestions.is_empty() {
        println!("No issues detected");
        return Ok(());
    }
    for (subject, notes) in &suggestions {
        for note in notes {
            println!("- {subject}: {note}");
        }
    }
    Ok(())
}

fn cmd_clean(path: &PathBuf, output: &PathBuf, options: &TreatOptions) -> Result<()> {
    let table = Table::from_path(path)?;
    let mut cleaner = Cleaner::new(table);
    let cleaned = cleaner.treat(options)?;

    for entry in cleaner.get_fix_log() {
        println!("- {entry}");
    }

    Exporter::new(cleaned).write(output)?;
    println!("Cleaned table written to {}", output.display());
    Ok(())
}

fn cmd_sort(path: &PathBuf, output: &PathBuf, by: Option<&str>, columns: bool) -> Result<()> {
    let table = Table::from_path(path)?;
    let mut organizer = Organizer::new(table);

    if columns {
        organizer.sort_columns();
    }
    if let Some(column) = by {
        organizer.sort_rows(column)?;
    }

    Exporter::new(organizer.table().clone()).write(output)?;
    println!("Sorted table written to {}", output.display());
    Ok(())
}

fn cmd_report(path: &PathBuf, output: Option<&std::path::Path>, json: bool) -> Result<()> {
    let table = Table::from_path(path)?;
    let mut reporter = ReportGenerator::new(table);
    let summary = reporter.report()?;
    let score = reporter.health_score()?;

    if json {
        let json = serde_json::json!({
            "path": path.display().to_string(),
            "summary": summary,
            "health_score": score,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json)
                .map_err(|e| crate::Error::InvalidFormat(e.to_string()))?
        );
    } else {
        print!("{summary}");
        println!();
        println!("Health score: {score}");
    }

    if let Some(path) = output {
        reporter.export_report(path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn cmd_run(path: &PathBuf, output: &PathBuf, report: Option<PathBuf>) -> Result<()> {
    let table = Table::from_path(path)?;
    let mut pipeline = Pipeline::new(Cleaner::new(table))
        .export_to(output)
        .with_report(true);
    if let Some(report) = &report {
        pipeline = pipeline.report_to(report);
    }

    let outcome = pipeline.run()?;

    println!("=== Diagnosing Issues ===");
    if outcome.suggestions.is_empty() {
        println!("- no issues detected");
    }
    for (subject, notes) in &outcome.suggestions {
        for note in notes {
            println!("- {subject}: {note}");
        }
    }

    println!();
    println!("=== Applying Treatments ===");
    println!();
    println!("=== Fix Log ===");
    for entry in &outcome.fix_log {
        println!("- {entry}");
    }

    println!();
    println!("=== Exporting Cleaned Data ===");
    println!("Cleaned table written to {}", output.display());

    if let Some(score) = outcome.health_score {
        println!();
        println!("=== Report Generated ===");
        println!("Health score: {score}");
        if let Some(report) = &report {
            println!("Report written to {}", report.display());
        }
    }
    Ok(())
}

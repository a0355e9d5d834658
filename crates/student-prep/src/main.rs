//! CLI entry point for the student performance preprocessing pipeline.

use anyhow::{Result, anyhow};
use chrono::Local;
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use serde::Serialize;
use std::path::{Path, PathBuf};
use student_prep::{
    CsvLoader, Pipeline, PipelineConfig, PipelineResult, PreprocessingSummary,
    UnknownCategoryPolicy,
};
use tracing::{error, info};

/// Environment variable naming a JSON config file used when `--config` is absent.
const CONFIG_ENV_VAR: &str = "STUDENT_PREP_CONFIG";

/// CLI-compatible unknown category policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliUnknownCategory {
    /// Fail on labels missing from a rank table
    Error,
    /// Encode unknown labels as missing and warn
    Null,
}

impl From<CliUnknownCategory> for UnknownCategoryPolicy {
    fn from(cli: CliUnknownCategory) -> Self {
        match cli {
            CliUnknownCategory::Error => UnknownCategoryPolicy::Error,
            CliUnknownCategory::Null => UnknownCategoryPolicy::Null,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Student Performance Preprocessing Pipeline",
    long_about = "Cleans and encodes the student performance dataset for model training.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  STUDENT_PREP_CONFIG   Path to a JSON config used when --config is not given\n  \
                  RUST_LOG              Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Preprocess and write the result\n  \
                  student-prep -i StudentPerformanceFactors.csv -o outputs/processed.csv\n\n  \
                  # Preview configured columns without processing\n  \
                  student-prep -i StudentPerformanceFactors.csv --dry-run\n\n  \
                  # Machine-readable summary\n  \
                  student-prep -i StudentPerformanceFactors.csv --json"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the processed CSV to write
    ///
    /// If not specified, the processed table is not saved
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What to do with labels that are missing from a rank table
    #[arg(long, value_enum)]
    unknown_category: Option<CliUnknownCategory>,

    /// Upper bound for the exam score column
    #[arg(long)]
    score_cap: Option<f64>,

    /// Preview what the pipeline will do without processing
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// JSON document printed with `--json`.
#[derive(Debug, Serialize)]
struct CliReport<'a> {
    generated_at: String,
    input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    summary: &'a PreprocessingSummary,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file before logging reads RUST_LOG
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;

    if args.dry_run {
        return run_dry_run(&args, &pipeline);
    }

    run_pipeline(&pipeline, &args)
}

/// Build the configuration: file (flag or env var), then CLI overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            PipelineConfig::from_json_file(&path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(policy) = args.unknown_category {
        config.unknown_category = policy.into();
    }
    if let Some(cap) = args.score_cap {
        config.score_upper_bound = cap;
    }

    config.validate()?;
    Ok(config)
}

/// Run dry-run mode - show what would happen without processing
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn run_dry_run(args: &Args, pipeline: &Pipeline) -> Result<()> {
    let config = pipeline.config();
    let data = CsvLoader::from_config(config).load(&args.input)?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of preprocessing actions");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input.display());
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("CONFIGURED COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<30} {:<16} {:<10} {:<10}", "Column", "Stage", "Present", "Missing");
    println!("{}", "-".repeat(70));

    let mut planned: Vec<(&str, &str)> = vec![(config.score_column.as_str(), "clip")];
    planned.extend(config.imputed_columns.iter().map(|c| (c.as_str(), "impute")));
    planned.extend(
        config
            .ordinal_mappings
            .iter()
            .map(|m| (m.column.as_str(), "ordinal")),
    );
    planned.extend(config.nominal_columns.iter().map(|c| (c.as_str(), "one-hot")));

    let mut absent = Vec::new();
    for (column, stage) in &planned {
        match data.column(column) {
            Ok(col) => println!(
                "{:<30} {:<16} {:<10} {:<10}",
                truncate_str(column, 29),
                stage,
                "yes",
                col.null_count()
            ),
            Err(_) => {
                println!("{:<30} {:<16} {:<10} {:<10}", truncate_str(column, 29), stage, "NO", "-");
                absent.push(*column);
            }
        }
    }
    println!();

    println!("PROPOSED ACTIONS");
    println!("{}", "-".repeat(40));
    println!(
        "  1. Clip '{}' to at most {}",
        config.score_column, config.score_upper_bound
    );
    println!(
        "  2. Fill missing values with the mode in: {}",
        config.imputed_columns.join(", ")
    );
    println!(
        "  3. Replace {} ordinal columns with ranks (unknown labels: {:?})",
        config.ordinal_mappings.len(),
        config.unknown_category
    );
    println!(
        "  4. One-hot encode {} nominal columns, dropping the first category",
        config.nominal_columns.len()
    );
    println!();

    if let Some(ref output) = args.output {
        println!("OUTPUT FILES (will be created)");
        println!("{}", "-".repeat(40));
        println!("  - {}", output.display());
        println!();
    }

    println!("{}", "=".repeat(80));
    if absent.is_empty() {
        println!("To execute this preprocessing, run without --dry-run");
    } else {
        println!("WARNING: the pipeline will fail, missing columns: {}", absent.join(", "));
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Run pipeline and print results
fn run_pipeline(pipeline: &Pipeline, args: &Args) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting student performance preprocessing...");
    info!("{}", "=".repeat(80));

    let mut result = match pipeline.run(&args.input) {
        Ok(result) => result,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    if let Some(ref output) = args.output {
        CsvLoader::from_config(pipeline.config()).write(&mut result.data, output)?;
    }

    handle_pipeline_output(&result, args)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
fn handle_pipeline_output(result: &PipelineResult, args: &Args) -> Result<()> {
    if args.json {
        let report = CliReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: args.input.display().to_string(),
            output_file: args.output.as_ref().map(|p| p.display().to_string()),
            summary: &result.summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&result.summary, &args.input, args.output.as_deref());
    Ok(())
}

/// Print a human-readable summary of the preprocessing results.
fn print_human_readable_summary(
    summary: &PreprocessingSummary,
    input: &Path,
    output: Option<&Path>,
) {
    println!();
    println!("{}", "=".repeat(80));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        input.display(),
        summary.rows_before,
        summary.columns_before
    );
    match output {
        Some(path) => println!(
            "Output: {} ({} rows x {} columns)",
            path.display(),
            summary.rows_after,
            summary.columns_after
        ),
        None => println!(
            "Output: not saved ({} rows x {} columns)",
            summary.rows_after, summary.columns_after
        ),
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Scores capped: {}", summary.values_capped);
    println!(
        "  Values imputed: {} (missing cells {} -> {})",
        summary.values_imputed, summary.missing_values_before, summary.missing_values_after
    );
    println!("  Ordinal columns encoded: {}", summary.ordinal_columns_encoded);
    println!("  Indicator columns created: {}", summary.indicator_columns_created);
    println!();

    let steps = summary.processing_steps();
    if !steps.is_empty() {
        println!("Actions Taken:");
        for step in steps.iter().take(10) {
            println!("  - {}", step);
        }
        if steps.len() > 10 {
            println!("  ... and {} more actions", steps.len() - 10);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Teacher_Quality", 29), "Teacher_Quality");
        assert_eq!(truncate_str("Parental_Education_Level", 10), "Parenta...");
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "student-prep",
            "-i",
            "data.csv",
            "--unknown-category",
            "null",
            "--score-cap",
            "90",
        ]);

        let config = build_config(&args).unwrap();

        assert_eq!(config.unknown_category, UnknownCategoryPolicy::Null);
        assert_eq!(config.score_upper_bound, 90.0);
    }
}

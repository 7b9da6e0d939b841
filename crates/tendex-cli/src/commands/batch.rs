//! Batch command - process every notice matching a glob pattern.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use tendex_core::{DocumentInput, Pipeline};

use super::process::{format_outcome, load_config, load_correlations, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g. "notices/*.txt")
    #[arg(required = true)]
    pattern: String,

    /// Output directory (one result file per input)
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Correlation snapshot built with `tendex corpus` (JSON)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference date for status heuristics (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let correlations = load_correlations(args.corpus.as_deref())?;
    let pipeline = Pipeline::new(config, correlations)?;

    let files: Vec<PathBuf> = glob::glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    if files.is_empty() {
        anyhow::bail!("No files match pattern: {}", args.pattern);
    }

    fs::create_dir_all(&args.output_dir)?;

    let today = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let extension = match args.format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    };

    let mut failures = 0usize;
    for file in &files {
        pb.set_message(file.display().to_string());

        let result = fs::read_to_string(file)
            .map_err(anyhow::Error::from)
            .and_then(|text| {
                let outcome = pipeline.extract(
                    &DocumentInput {
                        text,
                        tables: Vec::new(),
                    },
                    today,
                );
                format_outcome(&outcome, args.format)
            });

        match result {
            Ok(output) => {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "notice".to_string());
                fs::write(args.output_dir.join(format!("{stem}.{extension}")), output)?;
            }
            Err(e) => {
                warn!("Failed to process {}: {}", file.display(), e);
                failures += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    println!(
        "{} {} file(s) processed, {} failure(s)",
        style("✓").green(),
        files.len() - failures,
        failures
    );
    if let Some(stats) = pipeline.cache_stats() {
        println!(
            "{} cache: {} hit(s), {} miss(es)",
            style("ℹ").blue(),
            stats.hits,
            stats.misses
        );
    }

    Ok(())
}

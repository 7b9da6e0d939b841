//! Process command - extract lot records from a single notice file.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::info;

use tendex_core::{
    CorrelationTable, DocumentInput, ExtractionOutcome, FieldKey, Pipeline, Table, TendexConfig,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (decoded notice text)
    #[arg(required = true)]
    input: PathBuf,

    /// Tables extracted from the document layout (JSON)
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Correlation snapshot built with `tendex corpus` (JSON)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference date for status heuristics (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Show the quality report on stderr
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per lot
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let correlations = load_correlations(args.corpus.as_deref())?;
    let pipeline = Pipeline::new(config, correlations)?;

    let text = fs::read_to_string(&args.input)?;
    let tables = match &args.tables {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str::<Vec<Table>>(&content)?
        }
        None => Vec::new(),
    };

    info!("Processing file: {}", args.input.display());
    let today = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let outcome = pipeline.extract(&DocumentInput { text, tables }, today);

    if args.report {
        print_report(&outcome);
    }

    let output = format_outcome(&outcome, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TendexConfig> {
    let config = match config_path {
        Some(path) => TendexConfig::from_file(std::path::Path::new(path))?,
        None => TendexConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

pub fn load_correlations(path: Option<&std::path::Path>) -> anyhow::Result<CorrelationTable> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(CorrelationTable::default()),
    }
}

fn print_report(outcome: &ExtractionOutcome) {
    let report = &outcome.report;
    eprintln!(
        "{} {} record(s), confidence {:.0}%, completeness {:.0}%, {:?}",
        style("ℹ").blue(),
        report.record_count,
        report.overall_confidence * 100.0,
        report.completeness * 100.0,
        report.label(),
    );
    if let Some(strategy) = &report.segmentation_strategy {
        eprintln!("{} segmentation: {}", style("ℹ").blue(), strategy);
    }
    for correction in &report.corrections {
        eprintln!(
            "{} {}: {} -> {} ({})",
            style("✎").yellow(),
            correction.field.label(),
            correction.old_value,
            correction.new_value,
            correction.reason
        );
    }
    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
}

pub fn format_outcome(outcome: &ExtractionOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => format_csv(outcome),
        OutputFormat::Text => Ok(format_text(outcome)),
    }
}

/// CSV export: the published 44 French column labels, one row per lot.
fn format_csv(outcome: &ExtractionOutcome) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(FieldKey::ALL.iter().map(|k| k.label()))?;

    for record in &outcome.records {
        let row: Vec<String> = FieldKey::ALL
            .iter()
            .map(|key| {
                record
                    .get(*key)
                    .map(|entry| entry.value.display())
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcome: &ExtractionOutcome) -> String {
    let mut output = String::new();

    for record in &outcome.records {
        match record.lot_number {
            Some(n) => output.push_str(&format!("Lot {n}\n")),
            None => output.push_str("Procédure (lot unique)\n"),
        }
        for key in FieldKey::ALL {
            if let Some(entry) = record.get(key) {
                output.push_str(&format!("  {}: {}\n", key.label(), entry.value.display()));
            }
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendex_core::{FieldValue, LotRecord, QualityReport};

    fn outcome() -> ExtractionOutcome {
        let mut record = LotRecord::new(Some(1));
        record.set_extracted(
            FieldKey::IntituleLot,
            FieldValue::Text("Scanners".to_string()),
            0.9,
        );
        ExtractionOutcome {
            records: vec![record],
            report: QualityReport::default(),
            processing_time_ms: 0,
        }
    }

    #[test]
    fn test_csv_has_44_columns() {
        let csv = format_csv(&outcome()).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), 44);
        assert!(header.starts_with("Mots clés,Univers,Segment"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_text_format_names_the_lot() {
        let text = format_text(&outcome());
        assert!(text.starts_with("Lot 1\n"));
        assert!(text.contains("Intitulé du Lot: Scanners"));
    }
}

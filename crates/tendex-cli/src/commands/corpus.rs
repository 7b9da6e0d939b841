//! Corpus command - build a correlation snapshot from historical records.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use tendex_core::learn::CorrelationTable;
use tendex_core::TendexConfig;

/// Arguments for the corpus command.
#[derive(Args)]
pub struct CorpusArgs {
    /// Historical records, one JSON object per line
    #[arg(required = true)]
    input: PathBuf,

    /// Where to write the correlation snapshot
    #[arg(short, long, default_value = "correlations.json")]
    output: PathBuf,
}

pub async fn run(args: CorpusArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Corpus file not found: {}", args.input.display());
    }

    let config = TendexConfig::default();
    let table = CorrelationTable::build_from_jsonl(&args.input, &config.inference)?;

    let snapshot = serde_json::to_string_pretty(&table)?;
    fs::write(&args.output, snapshot)?;

    println!(
        "{} Snapshot built from {} record(s), written to {}",
        style("✓").green(),
        table.corpus_size,
        args.output.display()
    );

    Ok(())
}

//! pivot-rows: reshape wide NDJSON records into long key/value records
//!
//! Usage:
//!   # Read records from a file, write to stdout
//!   pivot-rows --schema schema.json data.jsonl
//!
//!   # Read from stdin with a pivot configuration
//!   cat data.jsonl | pivot-rows --schema schema.json --config pivot.json
//!
//!   # Write to a file and show skip diagnostics
//!   pivot-rows --schema schema.json --config pivot.json -o long.jsonl -v data.jsonl
//!
//! The schema file is a JSON array of `{"name": ..., "type": ...}` columns;
//! the config file is the pivot configuration object (`common_columns`,
//! `key_config`, `value_config`).

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use pivot::{
    decode_config, decode_row, JsonLinesSink, PivotConfig, PivotPlan, RowExpander, Schema,
};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pivot-rows")]
#[command(about = "Reshape wide NDJSON records into long key/value records", long_about = None)]
struct Args {
    /// Input file with one JSON object per line (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Input schema file: JSON array of {"name", "type"} columns
    #[arg(long, short = 's')]
    schema: String,

    /// Pivot configuration file (defaults apply if omitted)
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Show per-column plan and per-value skip diagnostics on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let schema = load_schema(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let plan = Arc::new(PivotPlan::from_schema(&schema, &config)?);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input file: {}", path))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    let sink = JsonLinesSink::new(writer, plan.output_schema().clone());
    let mut expander = RowExpander::open(Arc::clone(&plan), sink);

    let rows_in = process_lines(reader, &schema, &mut expander)?;

    expander.finish().context("Failed to flush output")?;
    let (emitted, skipped) = (expander.emitted(), expander.skipped());
    expander.close();

    eprintln!(
        "{} rows in, {} rows out, {} values skipped",
        rows_in, emitted, skipped
    );
    Ok(())
}

fn load_schema(path: &str) -> Result<Schema> {
    let file = File::open(path).with_context(|| format!("Failed to open schema file: {}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse schema file: {}", path))
}

fn load_config(path: Option<&str>) -> Result<PivotConfig> {
    let Some(path) = path else {
        return Ok(PivotConfig::default());
    };
    let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path))?;
    Ok(decode_config(&json)?)
}

fn process_lines<S: pivot::RowSink>(
    reader: Box<dyn BufRead>,
    schema: &Schema,
    expander: &mut RowExpander<S>,
) -> Result<u64> {
    let mut rows_in = 0u64;
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let json = parse_record(trimmed)
            .with_context(|| format!("Failed to parse JSON on line {}", number + 1))?;
        let row = decode_row(&json, schema)
            .with_context(|| format!("Failed to decode row on line {}", number + 1))?;

        expander.add(&row).context("Failed to write pivoted rows")?;
        rows_in += 1;
    }
    Ok(rows_in)
}

/// Parse one record with SIMD acceleration, falling back to serde_json on
/// inputs simd-json declines.
fn parse_record(line: &str) -> Result<serde_json::Value> {
    let mut bytes = line.as_bytes().to_vec();
    match simd_json::serde::from_slice::<serde_json::Value>(&mut bytes) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(line).map_err(Into::into),
    }
}

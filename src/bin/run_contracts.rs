//! Batch schedule runner
//!
//! Reads contract records from a CSV sheet, computes every schedule on the
//! rayon pool in chunks, writes the combined quarter schedule to CSV and the
//! run summary (with per-record errors) to JSON.

use amc_scheduler::{
    contract::load_records, BatchConfig, BatchProcessor, EngineConfig, ScheduleEngine,
};
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "run_contracts", about = "Compute quarterly AMC/warranty schedules for a contract sheet")]
struct Args {
    /// Input CSV (Product,Cost,Quantity,ContractStart,Kind,Rates)
    input: PathBuf,

    /// Combined schedule CSV output path
    #[arg(short, long, default_value = "schedules.csv")]
    output: PathBuf,

    /// Run summary JSON output path
    #[arg(long, default_value = "summary.json")]
    summary: PathBuf,

    /// Records per chunk
    #[arg(long, default_value_t = 25)]
    chunk_size: usize,

    /// Flat tax rate applied to every quarter
    #[arg(long, default_value_t = 0.18)]
    tax_rate: f64,

    /// Process chunks sequentially instead of on the rayon pool
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let records = load_records(&args.input)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("loading {}", args.input.display()))?;
    println!("Loaded {} records in {:?}", records.len(), start.elapsed());

    let engine = ScheduleEngine::new(EngineConfig {
        tax_rate: args.tax_rate,
        ..EngineConfig::default()
    });
    let processor = BatchProcessor::new(
        engine,
        BatchConfig {
            chunk_size: args.chunk_size,
            parallel: !args.sequential,
        },
    );

    let run_start = Instant::now();
    let output = processor.process_with_progress(&records, None, |p| {
        println!(
            "  chunk {}/{}: {}/{} records",
            p.chunk_index + 1,
            p.total_chunks,
            p.processed,
            p.total
        );
    });
    println!("Processed batch in {:?}", run_start.elapsed());

    // Combined schedule CSV, one row per (record, quarter)
    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writeln!(
        file,
        "Product,Quarter,AmountWithoutTax,AmountWithTax,Contributions"
    )?;
    for result in &output.results {
        let Some(schedule) = &result.schedule else { continue };
        for (key, amounts) in &schedule.schedule {
            writeln!(
                file,
                "{},{},{:.2},{:.2},{}",
                result.record_id,
                key,
                amounts.amount_without_tax,
                amounts.amount_with_tax,
                schedule.split_details[key].len()
            )?;
        }
    }
    println!("Schedules written to {}", args.output.display());

    // JSON summary with per-record errors, for the caller's UI layer
    let summary_json = serde_json::json!({
        "summary": output.summary,
        "errors": output
            .results
            .iter()
            .filter(|r| r.error.is_some())
            .map(|r| serde_json::json!({ "record_id": r.record_id, "error": r.error }))
            .collect::<Vec<_>>(),
    });
    std::fs::write(&args.summary, serde_json::to_string_pretty(&summary_json)?)
        .with_context(|| format!("writing {}", args.summary.display()))?;
    println!("Summary written to {}", args.summary.display());

    println!("\nBatch Summary:");
    println!("  Processed: {}", output.summary.processed);
    println!("  Succeeded: {}", output.summary.succeeded);
    println!("  Failed:    {}", output.summary.failed);
    println!("  Total with tax: {:.2}", output.summary.total_amount_with_tax);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}

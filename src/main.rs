//! AMC Scheduler CLI
//!
//! Demo run: computes one AMC schedule and prints the quarter table with
//! its split breakdown

use amc_scheduler::{ContractRecord, ScheduleEngine};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;

fn main() {
    env_logger::init();

    println!("AMC Scheduler v0.1.0");
    println!("====================\n");

    // Sample contract: mid-quarter start, so every contract-year boundary
    // produces a prorated/residual split
    let record = ContractRecord::amc(
        "Core Router X1",
        100_000.0,
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
    );

    println!("Contract: {}", record.id);
    println!("  Start:  {}", record.contract_start);
    println!("  Value:  {:.2}", record.total_value);
    println!();

    let engine = ScheduleEngine::default();
    let result = match engine.compute(&record) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("schedule computation failed: {}", err);
            std::process::exit(1);
        }
    };

    println!("Schedule ({} quarters):", result.summary.total_quarters);
    println!(
        "{:>8} {:>14} {:>14}  {}",
        "Quarter", "Pre-tax", "With tax", "Breakdown"
    );
    println!("{}", "-".repeat(78));

    for (key, amounts) in &result.schedule {
        let breakdown: Vec<String> = result.split_details[key]
            .iter()
            .map(|c| {
                format!(
                    "CY{} {:?} {}/{}d = {:.2}",
                    c.contract_year + 1,
                    c.calculation,
                    c.overlap_days,
                    c.total_days_in_quarter,
                    c.actual_amount
                )
            })
            .collect();
        println!(
            "{:>8} {:>14.2} {:>14.2}  {}",
            key.to_string(),
            amounts.amount_without_tax,
            amounts.amount_with_tax,
            breakdown.join(" + ")
        );
    }

    println!("\nSummary:");
    println!("  Contract value:  {:.2}", result.summary.total_contract_value);
    println!("  Quarters billed: {}", result.summary.total_quarters);
    println!("  Total with tax:  {:.2}", result.summary.total_amount_with_tax);

    // Write full schedule to CSV for spreadsheet comparison
    let csv_path = "schedule_output.csv";
    let mut file = File::create(csv_path).expect("Unable to create CSV file");
    writeln!(file, "Quarter,AmountWithoutTax,AmountWithTax").unwrap();
    for (key, amounts) in &result.schedule {
        writeln!(
            file,
            "{},{:.2},{:.2}",
            key, amounts.amount_without_tax, amounts.amount_with_tax
        )
        .unwrap();
    }
    println!("\nFull schedule written to: {}", csv_path);
}

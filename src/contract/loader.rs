//! Load contract records from CSV

use super::{ContractKind, ContractRecord};
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the contract input sheet columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Cost")]
    cost: f64,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "ContractStart")]
    contract_start: String,
    #[serde(rename = "Kind")]
    kind: String,
    /// Optional semicolon-separated per-year rates, e.g. "0.20;0.225;0.275;0.30"
    #[serde(rename = "Rates", default)]
    rates: String,
}

impl CsvRow {
    fn to_record(self) -> Result<ContractRecord, Box<dyn Error>> {
        let kind = match self.kind.as_str() {
            "AMC" => ContractKind::Amc,
            "Warranty" => ContractKind::Warranty,
            other => return Err(format!("Unknown Kind: {}", other).into()),
        };

        let contract_start = NaiveDate::parse_from_str(&self.contract_start, "%Y-%m-%d")
            .map_err(|e| format!("Bad ContractStart `{}`: {}", self.contract_start, e))?;

        let rates = if self.rates.trim().is_empty() {
            None
        } else {
            let parsed: Result<Vec<f64>, _> =
                self.rates.split(';').map(|r| r.trim().parse()).collect();
            Some(parsed.map_err(|e| format!("Bad Rates `{}`: {}", self.rates, e))?)
        };

        Ok(ContractRecord {
            id: self.product,
            total_value: self.cost * self.quantity,
            contract_start,
            kind,
            rates,
        })
    }
}

/// Load all contract records from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ContractRecord>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record()?);
    }

    Ok(records)
}

/// Load contract records from any reader (e.g. string buffer, network stream)
pub fn load_records_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<ContractRecord>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record()?);
    }

    Ok(records)
}

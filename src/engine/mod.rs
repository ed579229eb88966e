//! Quarter-aligned schedule engine
//!
//! One generic engine serves both contract kinds: AMC contracts run on the
//! configured per-year ROI rates, warranty contracts on a flat rate spread
//! evenly across the warranty years. Everything downstream of the rate
//! resolution is shared.

pub mod aggregate;
pub mod allocation;

pub use aggregate::{aggregate, round2, ScheduleEntry};
pub use allocation::{allocate, CalculationType, QuarterContribution};

use crate::calendar::QuarterKey;
use crate::contract::{partition, ContractKind, ContractRecord};
use crate::error::EngineError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Engine configuration
///
/// Explicit replacement for what used to live in module-level globals
/// (quarter order, ROI rate table, GST rate); every computation reads the
/// config it was handed and nothing else.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Flat tax applied to every quarter's pre-tax amount (e.g. 0.18 GST)
    pub tax_rate: f64,

    /// Default per-contract-year AMC rates, in contract-year order
    pub amc_rates: Vec<f64>,

    /// Total warranty rate, spread evenly across `warranty_years`
    pub warranty_rate: f64,

    /// Warranty duration in years
    pub warranty_years: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.18,
            amc_rates: vec![0.20, 0.225, 0.275, 0.30],
            warranty_rate: 0.15,
            warranty_years: 5,
        }
    }
}

/// Pre-tax and post-tax amounts for one calendar quarter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuarterAmounts {
    pub amount_with_tax: f64,
    pub amount_without_tax: f64,
}

/// Per-record rollup figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordSummary {
    pub total_contract_value: f64,
    /// Number of calendar quarters that received money
    pub total_quarters: usize,
    pub total_amount_with_tax: f64,
}

/// Computed schedule for one contract record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    /// Identity of the input record
    pub record_id: String,
    /// Quarter -> payable amounts, in chronological key order
    pub schedule: BTreeMap<QuarterKey, QuarterAmounts>,
    /// Quarter -> contribution audit trail, parallel to `schedule`
    pub split_details: BTreeMap<QuarterKey, Vec<QuarterContribution>>,
    /// Record-level rollup
    pub summary: RecordSummary,
}

/// The schedule engine: partition, allocate, aggregate
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    config: EngineConfig,
}

impl ScheduleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the full quarterly schedule for one record
    pub fn compute(&self, record: &ContractRecord) -> Result<ScheduleResult, EngineError> {
        let rates = self.resolve_rates(record);
        let windows = partition(record.contract_start, record.total_value, &rates)?;
        let contributions = allocate(&windows)?;
        let entries = aggregate(contributions, self.config.tax_rate);

        let mut schedule = BTreeMap::new();
        let mut split_details = BTreeMap::new();
        let mut total_amount_with_tax = 0.0;
        for (key, entry) in entries {
            total_amount_with_tax += entry.amount_with_tax;
            schedule.insert(
                key,
                QuarterAmounts {
                    amount_with_tax: entry.amount_with_tax,
                    amount_without_tax: entry.amount_without_tax,
                },
            );
            split_details.insert(key, entry.contributions);
        }

        Ok(ScheduleResult {
            record_id: record.id.clone(),
            summary: RecordSummary {
                total_contract_value: record.total_value,
                total_quarters: schedule.len(),
                total_amount_with_tax: round2(total_amount_with_tax),
            },
            schedule,
            split_details,
        })
    }

    /// Per-year rates for a record: explicit override first, then the
    /// kind's configured defaults
    fn resolve_rates(&self, record: &ContractRecord) -> Vec<f64> {
        if let Some(rates) = &record.rates {
            return rates.clone();
        }
        match record.kind {
            ContractKind::Amc => self.config.amc_rates.clone(),
            ContractKind::Warranty => {
                let per_year = self.config.warranty_rate / self.config.warranty_years as f64;
                vec![per_year; self.config.warranty_years]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::QuarterLabel;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_aligned_amc_contract_end_to_end() {
        // Start on a quarter boundary: 16 full quarters, no residuals,
        // pre-tax total exactly the contract value (rates sum to 1.0).
        let engine = ScheduleEngine::default();
        let record = ContractRecord::amc("Router X1", 100_000.0, d(2024, 1, 5));
        let result = engine.compute(&record).unwrap();

        assert_eq!(result.summary.total_quarters, 16);
        assert_eq!(result.schedule.len(), result.split_details.len());

        let q1 = &result.schedule[&QuarterKey::new(2024, QuarterLabel::Q1)];
        assert_eq!(q1.amount_without_tax, 5_000.0);
        assert_eq!(q1.amount_with_tax, 5_900.0);

        for details in result.split_details.values() {
            assert_eq!(details.len(), 1);
            assert_eq!(details[0].calculation, CalculationType::Prorated);
        }

        let pre_tax: f64 = result
            .schedule
            .values()
            .map(|a| a.amount_without_tax)
            .sum();
        assert_eq!(pre_tax, 100_000.0);
    }

    #[test]
    fn test_mid_quarter_amc_contract_end_to_end() {
        let engine = ScheduleEngine::default();
        let record = ContractRecord::amc("UPS 3kVA", 100_000.0, d(2024, 3, 15));
        let result = engine.compute(&record).unwrap();

        // 4 whole years of coverage shifted off the quarter grid touch 17
        // calendar quarters.
        assert_eq!(result.summary.total_quarters, 17);

        // Every interior boundary quarter carries a prorated + residual pair.
        for year in [2025, 2026, 2027] {
            let details = &result.split_details[&QuarterKey::new(year, QuarterLabel::Q1)];
            assert_eq!(details.len(), 2, "{}-Q1", year);
            assert!(details
                .iter()
                .any(|c| c.calculation == CalculationType::Residual));
            assert!(details
                .iter()
                .any(|c| c.calculation == CalculationType::Prorated));
        }

        // Rounded per-quarter, so allow a paisa per key.
        let pre_tax: f64 = result
            .schedule
            .values()
            .map(|a| a.amount_without_tax)
            .sum();
        assert_abs_diff_eq!(pre_tax, 100_000.0, epsilon = 0.17);

        for amounts in result.schedule.values() {
            assert_eq!(
                amounts.amount_with_tax,
                round2(amounts.amount_without_tax * 1.18)
            );
        }
    }

    #[test]
    fn test_warranty_rates_spread_evenly() {
        let engine = ScheduleEngine::default();
        let record = ContractRecord::warranty("Switch S9", 200_000.0, d(2024, 1, 5));
        let result = engine.compute(&record).unwrap();

        // 5 warranty years of 4 quarters each, 3% per year
        assert_eq!(result.summary.total_quarters, 20);
        let q1 = &result.schedule[&QuarterKey::new(2024, QuarterLabel::Q1)];
        assert_eq!(q1.amount_without_tax, 1_500.0);

        let pre_tax: f64 = result
            .schedule
            .values()
            .map(|a| a.amount_without_tax)
            .sum();
        assert_abs_diff_eq!(pre_tax, 30_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rate_override_beats_kind_defaults() {
        let engine = ScheduleEngine::default();
        let record =
            ContractRecord::amc("X", 10_000.0, d(2024, 1, 5)).with_rates(vec![0.5, 0.5]);
        let result = engine.compute(&record).unwrap();

        assert_eq!(result.summary.total_quarters, 8);
        let q1 = &result.schedule[&QuarterKey::new(2024, QuarterLabel::Q1)];
        assert_eq!(q1.amount_without_tax, 1_250.0);
    }

    #[test]
    fn test_invalid_value_propagates() {
        let engine = ScheduleEngine::default();
        let record = ContractRecord::amc("Broken", -5.0, d(2024, 1, 5));
        let err = engine.compute(&record).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput {
                field: "total_value",
                ..
            }
        ));
    }

    #[test]
    fn test_summary_total_matches_schedule() {
        let engine = ScheduleEngine::default();
        let record = ContractRecord::amc("Router X1", 250_000.0, d(2023, 8, 20));
        let result = engine.compute(&record).unwrap();

        let with_tax: f64 = result.schedule.values().map(|a| a.amount_with_tax).sum();
        assert!((result.summary.total_amount_with_tax - round2(with_tax)).abs() < 1e-9);
    }
}

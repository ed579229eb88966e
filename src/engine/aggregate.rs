//! Schedule aggregation and tax application
//!
//! Sums the per-quarter contributions, rounds once to currency precision,
//! applies the flat tax, and keeps the contribution list attached so every
//! figure can be traced back to the overlaps that produced it.

use super::allocation::QuarterContribution;
use crate::calendar::QuarterKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final per-quarter schedule entry with its audit trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    /// Every contribution that landed in this quarter, tagged with how its
    /// payable amount was derived
    pub contributions: Vec<QuarterContribution>,
    /// Sum of payable amounts, rounded to 2 decimals
    pub amount_without_tax: f64,
    /// `round2(amount_without_tax * (1 + tax_rate))`
    pub amount_with_tax: f64,
}

/// Round half-up to 2 decimal places
///
/// Amounts are non-negative, so `f64::round` (half away from zero) is
/// half-up here.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Collapse raw contributions into the final keyed schedule
///
/// Rounding is applied exactly once to the summed pre-tax amount and once
/// after tax, never per contribution; reordering those steps drifts totals
/// by whole paise against the expected figures.
pub fn aggregate(
    contributions: BTreeMap<QuarterKey, Vec<QuarterContribution>>,
    tax_rate: f64,
) -> BTreeMap<QuarterKey, ScheduleEntry> {
    contributions
        .into_iter()
        .map(|(key, contributions)| {
            let amount_without_tax =
                round2(contributions.iter().map(|c| c.actual_amount).sum());
            let amount_with_tax = round2(amount_without_tax * (1.0 + tax_rate));
            (
                key,
                ScheduleEntry {
                    contributions,
                    amount_without_tax,
                    amount_with_tax,
                },
            )
        })
        .collect()
}

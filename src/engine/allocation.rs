//! Quarter allocation engine
//!
//! Maps each contract year's quarterly charge onto the calendar quarters it
//! overlaps. Quarters fully inside a contract year get the full charge; the
//! boundary quarter at first contact gets a day-prorated slice, and the
//! shortfall is collected as a residual when that contract year touches the
//! same quarter bucket again a year later.

use crate::calendar::{overlap, quarter_date_range, span_days, QuarterKey, QuarterLabel};
use crate::contract::ContractYearWindow;
use crate::error::EngineError;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// How a contribution's payable amount was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationType {
    /// First contact of a contract year with this quarter bucket:
    /// pays the day-prorated slice
    Prorated,
    /// Later contact: pays the contract year's full quarterly charge minus
    /// the amount recorded at first contact
    Residual,
    /// Degenerate repeat within the same display year: the prorated value
    /// is retained as-is
    NoResidual,
}

/// One contract-year-to-calendar-quarter contribution, with its audit fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterContribution {
    /// Calendar quarter receiving the money
    pub key: QuarterKey,
    /// 0-based contract year the money comes from
    pub contract_year: usize,
    /// That contract year's rate fraction
    pub rate: f64,
    /// That contract year's undivided quarterly charge
    pub full_quarter_amount: f64,
    /// Days of overlap between the window and the quarter
    pub overlap_days: i64,
    /// Full length of the quarter in days
    pub total_days_in_quarter: i64,
    /// `full_quarter_amount * overlap_days / total_days_in_quarter`
    pub prorated_amount: f64,
    /// Amount actually payable in this quarter (prorated or residual)
    pub actual_amount: f64,
    /// Which rule produced `actual_amount`
    pub calculation: CalculationType,
}

/// Allocate contract-year charges to calendar quarters
///
/// Scans calendar years `start.year - 1 ..= end.year + 1` per window (a
/// defensive margin; real overlaps only occur inside `start.year ..
/// end.year`) and all four quarter labels, keeping overlapping pairs.
///
/// Within one window, the occurrences of a quarter label are ordered by
/// display year: the first pays its prorated slice, any later one pays
/// `max(0, full_quarter_amount - basis)` where `basis` is the first amount
/// recorded at the first occurrence's key. The basis map is first-writer-wins
/// across windows, so when two contract years first touch the same quarter
/// the later window's residual is measured against the earlier window's
/// recorded amount, whichever contract year it came from. For the windows
/// `partition` produces (consecutive, 1 year each) the first writer is always
/// the window itself and `prorated + residual == full_quarter_amount` holds
/// exactly.
///
/// Pure and deterministic: identical windows yield identical maps.
pub fn allocate(
    windows: &[ContractYearWindow],
) -> Result<BTreeMap<QuarterKey, Vec<QuarterContribution>>, EngineError> {
    let mut schedule: BTreeMap<QuarterKey, Vec<QuarterContribution>> = BTreeMap::new();
    // First amount recorded at each quarter key, first writer wins
    let mut first_amounts: HashMap<QuarterKey, f64> = HashMap::new();

    for window in windows {
        // Raw overlaps per label, in display-year order (year scan ascends)
        let mut legs: [Vec<RawLeg>; 4] = Default::default();

        let start_year = window.start.year() - 1;
        let end_year = window.end.year() + 1;
        for year in start_year..=end_year {
            for (slot, &label) in QuarterLabel::ALL.iter().enumerate() {
                let (q_start, q_end) = quarter_date_range(label, year);
                let Some(hit) = overlap(window.start, window.end, q_start, q_end) else {
                    continue;
                };
                let quarter_days = span_days(q_start, q_end);
                if quarter_days <= 0 {
                    return Err(EngineError::LogicInvariant(format!(
                        "quarter {}-{} has non-positive length {}",
                        year, label, quarter_days
                    )));
                }
                legs[slot].push(RawLeg {
                    key: QuarterKey::new(year, label),
                    overlap_days: hit.days,
                    quarter_days,
                    prorated: window.full_quarter_amount * hit.days as f64 / quarter_days as f64,
                });
            }
        }

        for group in &legs {
            let Some(first) = group.first() else { continue };

            let first_basis = *first_amounts.entry(first.key).or_insert(first.prorated);

            for (pos, leg) in group.iter().enumerate() {
                let (actual, calculation) = if pos == 0 {
                    (leg.prorated, CalculationType::Prorated)
                } else if leg.key.year == first.key.year {
                    (leg.prorated, CalculationType::NoResidual)
                } else {
                    (
                        (window.full_quarter_amount - first_basis).max(0.0),
                        CalculationType::Residual,
                    )
                };

                schedule.entry(leg.key).or_default().push(QuarterContribution {
                    key: leg.key,
                    contract_year: window.index,
                    rate: window.rate,
                    full_quarter_amount: window.full_quarter_amount,
                    overlap_days: leg.overlap_days,
                    total_days_in_quarter: leg.quarter_days,
                    prorated_amount: leg.prorated,
                    actual_amount: actual,
                    calculation,
                });
            }
        }
    }

    Ok(schedule)
}

#[derive(Debug, Clone, Copy)]
struct RawLeg {
    key: QuarterKey,
    overlap_days: i64,
    quarter_days: i64,
    prorated: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::partition;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const RATES: [f64; 4] = [0.20, 0.225, 0.275, 0.30];

    #[test]
    fn test_aligned_start_has_no_residuals() {
        // 2024-01-05 is exactly a quarter boundary: every contract year
        // covers 4 whole quarters, so 16 keys, one full contribution each.
        let windows = partition(d(2024, 1, 5), 100_000.0, &RATES).unwrap();
        let schedule = allocate(&windows).unwrap();

        assert_eq!(schedule.len(), 16);
        for (key, contributions) in &schedule {
            assert_eq!(contributions.len(), 1, "{} has multiple legs", key);
            let c = &contributions[0];
            assert_eq!(c.calculation, CalculationType::Prorated);
            assert_eq!(c.overlap_days, c.total_days_in_quarter);
            assert!((c.actual_amount - c.full_quarter_amount).abs() < 1e-9);
        }

        let total: f64 = schedule
            .values()
            .flatten()
            .map(|c| c.actual_amount)
            .sum();
        assert!((total - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_mid_quarter_start_splits_boundary_quarters() {
        let windows = partition(d(2024, 3, 15), 100_000.0, &RATES).unwrap();
        let schedule = allocate(&windows).unwrap();

        // First contact: 2024-Q1 (Jan 5 - Apr 4 2024, 91 days in a leap
        // year), overlapped Mar 15 - Apr 4 = 21 days.
        let first = &schedule[&QuarterKey::new(2024, QuarterLabel::Q1)];
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].overlap_days, 21);
        assert_eq!(first[0].total_days_in_quarter, 91);
        assert_eq!(first[0].calculation, CalculationType::Prorated);
        assert!((first[0].actual_amount - 5_000.0 * 21.0 / 91.0).abs() < 1e-9);

        // 2025-Q1 holds contract year 0's residual plus contract year 1's
        // prorated first contact.
        let boundary = &schedule[&QuarterKey::new(2025, QuarterLabel::Q1)];
        assert_eq!(boundary.len(), 2);

        let residual = boundary
            .iter()
            .find(|c| c.calculation == CalculationType::Residual)
            .unwrap();
        assert_eq!(residual.contract_year, 0);
        // prorated + residual == that contract year's full quarterly charge
        assert!((first[0].actual_amount + residual.actual_amount - 5_000.0).abs() < 1e-9);
        assert!(residual.actual_amount >= 0.0);

        let prorated = boundary
            .iter()
            .find(|c| c.calculation == CalculationType::Prorated)
            .unwrap();
        assert_eq!(prorated.contract_year, 1);
        assert_eq!(prorated.overlap_days, 21);
    }

    #[test]
    fn test_pre_tax_total_is_conserved() {
        for start in [d(2024, 3, 15), d(2023, 11, 30), d(2024, 2, 29), d(2025, 1, 4)] {
            let windows = partition(start, 100_000.0, &RATES).unwrap();
            let schedule = allocate(&windows).unwrap();
            let total: f64 = schedule
                .values()
                .flatten()
                .map(|c| c.actual_amount)
                .sum();
            assert!(
                (total - 100_000.0).abs() < 1e-6,
                "start {}: total {}",
                start,
                total
            );
        }
    }

    #[test]
    fn test_day_count_conservation_per_window() {
        // All of a window's overlap days across quarters add back up to the
        // window's own length.
        let windows = partition(d(2024, 3, 15), 100_000.0, &RATES).unwrap();
        let schedule = allocate(&windows).unwrap();

        for window in &windows {
            let days: i64 = schedule
                .values()
                .flatten()
                .filter(|c| c.contract_year == window.index)
                .map(|c| c.overlap_days)
                .sum();
            assert_eq!(days, span_days(window.start, window.end));
        }
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let windows = partition(d(2024, 3, 15), 100_000.0, &RATES).unwrap();
        assert_eq!(allocate(&windows).unwrap(), allocate(&windows).unwrap());
    }

    #[test]
    fn test_cross_year_residual_basis_is_first_writer() {
        // Hand-built overlapping windows (not producible by `partition`):
        // both first touch 2024-Q2, so the second window's residual at
        // 2025-Q2 is measured against the FIRST window's recorded amount,
        // not its own prorated leg. This pins the engine's literal
        // first-writer-wins behavior.
        let w0 = ContractYearWindow {
            index: 0,
            start: d(2024, 4, 5),
            end: d(2025, 4, 4),
            rate: 0.20,
            full_quarter_amount: 5_000.0,
        };
        let w1 = ContractYearWindow {
            index: 1,
            start: d(2024, 5, 1),
            end: d(2025, 7, 31),
            rate: 0.32,
            full_quarter_amount: 8_000.0,
        };
        let schedule = allocate(&[w0, w1]).unwrap();

        // w0 seeds 2024-Q2 with its full 5000 before w1 gets there.
        let q2_2025 = &schedule[&QuarterKey::new(2025, QuarterLabel::Q2)];
        let residual = q2_2025
            .iter()
            .find(|c| c.contract_year == 1 && c.calculation == CalculationType::Residual)
            .unwrap();
        assert_eq!(residual.actual_amount, 8_000.0 - 5_000.0);
    }

    #[test]
    fn test_residual_clamps_at_zero() {
        // Same construction, but the second window's charge is smaller than
        // the basis recorded by the first: the residual clamps to 0.
        let w0 = ContractYearWindow {
            index: 0,
            start: d(2024, 4, 5),
            end: d(2025, 4, 4),
            rate: 0.20,
            full_quarter_amount: 5_000.0,
        };
        let w1 = ContractYearWindow {
            index: 1,
            start: d(2024, 5, 1),
            end: d(2025, 7, 31),
            rate: 0.08,
            full_quarter_amount: 2_000.0,
        };
        let schedule = allocate(&[w0, w1]).unwrap();

        let q2_2025 = &schedule[&QuarterKey::new(2025, QuarterLabel::Q2)];
        let residual = q2_2025
            .iter()
            .find(|c| c.contract_year == 1 && c.calculation == CalculationType::Residual)
            .unwrap();
        assert_eq!(residual.actual_amount, 0.0);
    }
}

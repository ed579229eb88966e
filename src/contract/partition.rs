//! Contract-year partitioner
//!
//! Splits a contract into consecutive 1-year windows anchored at the start
//! date's anniversaries, one window per entry in the rate schedule. Each
//! window carries the undivided charge a single quarter inside it would bear
//! before any calendar alignment.

use crate::error::EngineError;
use chrono::{Days, Months, NaiveDate};

/// One contract year with its rate and undivided quarterly charge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractYearWindow {
    /// 0-based contract year index
    pub index: usize,
    /// First day of the window (anniversary of the contract start)
    pub start: NaiveDate,
    /// Last day of the window (day before the next anniversary)
    pub end: NaiveDate,
    /// Rate fraction applied to the contract value for this year
    pub rate: f64,
    /// `total_value * rate / 4`: the charge each of this year's 4 quarters
    /// would bear if quarters aligned with the calendar
    pub full_quarter_amount: f64,
}

/// Derive the contract-year windows for a contract
///
/// `rates` holds one fraction per contract year (e.g. `0.20` for 20%), so
/// its length is the contract duration in years. Anniversaries are computed
/// with calendar year-adds: a Feb 29 start clamps to Feb 28 in non-leap
/// years, and windows stay contiguous either way.
pub fn partition(
    contract_start: NaiveDate,
    total_value: f64,
    rates: &[f64],
) -> Result<Vec<ContractYearWindow>, EngineError> {
    if rates.is_empty() {
        return Err(EngineError::invalid_input(
            "rates",
            "rate schedule is empty; need one rate per contract year",
        ));
    }
    if !(total_value > 0.0) {
        return Err(EngineError::invalid_input(
            "total_value",
            format!("must be positive, got {}", total_value),
        ));
    }

    let mut windows = Vec::with_capacity(rates.len());
    for (index, &rate) in rates.iter().enumerate() {
        let start = add_years(contract_start, index)?;
        let end = add_years(contract_start, index + 1)?
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| {
                EngineError::invalid_input("contract_start", "date arithmetic underflow")
            })?;
        windows.push(ContractYearWindow {
            index,
            start,
            end,
            rate,
            full_quarter_amount: total_value * rate / 4.0,
        });
    }
    Ok(windows)
}

fn add_years(date: NaiveDate, years: usize) -> Result<NaiveDate, EngineError> {
    date.checked_add_months(Months::new(12 * years as u32))
        .ok_or_else(|| EngineError::invalid_input("contract_start", "date arithmetic overflow"))
}

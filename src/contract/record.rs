//! Normalized contract input record
//!
//! The parsing/UI layer is responsible for field normalization (including
//! deriving the AMC start date from the installation date); the engine only
//! ever sees this strongly-typed record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which obligation schedule this contract follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// Annual maintenance contract, billed on per-year ROI rates
    Amc,
    /// Warranty obligation, billed as a flat rate spread evenly
    Warranty,
}

/// One normalized input record for the schedule engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Identity carried through results and error reports (product name)
    pub id: String,

    /// Total contract value; must be positive
    pub total_value: f64,

    /// First day of the first contract year. For AMC contracts the caller
    /// has already shifted this past the warranty period.
    pub contract_start: NaiveDate,

    /// AMC or warranty parameterization
    pub kind: ContractKind,

    /// Per-contract-year rate fractions. When absent, the engine falls back
    /// to the defaults configured for this record's kind.
    pub rates: Option<Vec<f64>>,
}

impl ContractRecord {
    /// AMC record using the engine's default ROI rates
    pub fn amc(id: impl Into<String>, total_value: f64, contract_start: NaiveDate) -> Self {
        Self {
            id: id.into(),
            total_value,
            contract_start,
            kind: ContractKind::Amc,
            rates: None,
        }
    }

    /// Warranty record using the engine's default flat rate
    pub fn warranty(id: impl Into<String>, total_value: f64, contract_start: NaiveDate) -> Self {
        Self {
            id: id.into(),
            total_value,
            contract_start,
            kind: ContractKind::Warranty,
            rates: None,
        }
    }

    /// Override the per-year rates for this record
    pub fn with_rates(mut self, rates: Vec<f64>) -> Self {
        self.rates = Some(rates);
        self
    }
}

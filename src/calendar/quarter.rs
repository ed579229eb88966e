//! Calendar quarter model
//!
//! Quarters in this system do NOT follow the standard Jan-Mar/Apr-Jun
//! convention: each quarter starts on the 5th of January, April, July or
//! October, and Q4 wraps into the next calendar year, ending on January 4th.
//! A quarter instance is keyed by the calendar year its start date falls in
//! (the "display year"), so Q4 of 2024 runs 2024-10-05 through 2025-01-04.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// Day of month every quarter starts on
pub const QUARTER_START_DAY: u32 = 5;

/// The four fixed quarter buckets, in cyclic order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuarterLabel {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl QuarterLabel {
    /// All labels in schedule order
    pub const ALL: [QuarterLabel; 4] = [
        QuarterLabel::Q1,
        QuarterLabel::Q2,
        QuarterLabel::Q3,
        QuarterLabel::Q4,
    ];

    /// Month (1-based) this quarter starts in
    pub fn start_month(self) -> u32 {
        match self {
            QuarterLabel::Q1 => 1,
            QuarterLabel::Q2 => 4,
            QuarterLabel::Q3 => 7,
            QuarterLabel::Q4 => 10,
        }
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuarterLabel::Q1 => "Q1",
            QuarterLabel::Q2 => "Q2",
            QuarterLabel::Q3 => "Q3",
            QuarterLabel::Q4 => "Q4",
        };
        f.write_str(s)
    }
}

/// Composite key identifying one calendar quarter instance
///
/// Ordered by `(year, label)` so schedule maps iterate chronologically.
/// Replaces the string keys (`"2024-Q1"`) the schedule used to be built on;
/// `Display` still renders that form for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    /// Display year: the year the quarter's start date falls in
    pub year: i32,
    /// Quarter bucket within that year
    pub label: QuarterLabel,
}

impl QuarterKey {
    pub fn new(year: i32, label: QuarterLabel) -> Self {
        Self { year, label }
    }

    /// Inclusive date range of this quarter instance
    pub fn date_range(self) -> (NaiveDate, NaiveDate) {
        quarter_date_range(self.label, self.year)
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.label)
    }
}

impl Serialize for QuarterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive `[start, end]` range of a quarter instance
///
/// Q1: Jan 5 - Apr 4, Q2: Apr 5 - Jul 4, Q3: Jul 5 - Oct 4,
/// Q4: Oct 5 - Jan 4 of `year + 1`. Pure function of `(label, year)`,
/// valid for any year the allocation scan asks about (including `year - 1`
/// relative to a contract window).
pub fn quarter_date_range(label: QuarterLabel, year: i32) -> (NaiveDate, NaiveDate) {
    let start = ymd(year, label.start_month(), QUARTER_START_DAY);
    let end = match label {
        QuarterLabel::Q1 => ymd(year, 4, 4),
        QuarterLabel::Q2 => ymd(year, 7, 4),
        QuarterLabel::Q3 => ymd(year, 10, 4),
        QuarterLabel::Q4 => ymd(year + 1, 1, 4),
    };
    (start, end)
}

// Day 4/5 of months 1/4/7/10 exists in every year chrono can represent.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("fixed quarter boundary date is valid")
}

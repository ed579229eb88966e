//! Fixed calendar-quarter model and day-interval arithmetic

pub mod interval;
pub mod quarter;

pub use interval::{overlap, span_days, Overlap};
pub use quarter::{quarter_date_range, QuarterKey, QuarterLabel};

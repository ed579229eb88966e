//! Day-interval intersection
//!
//! All ranges here are inclusive on both ends and counted in whole days via
//! date subtraction. No calendar-aware month arithmetic is involved, so
//! counts stay exact across leap years.

use chrono::NaiveDate;

/// Intersection of two inclusive date ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    /// First day both ranges share
    pub start: NaiveDate,
    /// Last day both ranges share
    pub end: NaiveDate,
    /// Inclusive day count, `>= 1`
    pub days: i64,
}

/// Intersect `[a_start, a_end]` with `[b_start, b_end]`
///
/// Returns `None` when the ranges are disjoint (`a_end < b_start` or
/// `a_start > b_end`).
pub fn overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> Option<Overlap> {
    if a_end < b_start || a_start > b_end {
        return None;
    }
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    Some(Overlap {
        start,
        end,
        days: span_days(start, end),
    })
}

/// Inclusive day count of `[start, end]`
///
/// A single day counts as 1. Callers guarantee `start <= end`.
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_disjoint_ranges() {
        assert!(overlap(d(2024, 1, 1), d(2024, 1, 31), d(2024, 2, 1), d(2024, 2, 29)).is_none());
        assert!(overlap(d(2024, 3, 1), d(2024, 3, 31), d(2024, 1, 1), d(2024, 2, 29)).is_none());
    }

    #[test]
    fn test_adjacent_single_day() {
        // Touching on exactly one day still overlaps, with days == 1
        let o = overlap(d(2024, 1, 1), d(2024, 2, 1), d(2024, 2, 1), d(2024, 3, 1)).unwrap();
        assert_eq!(o.start, d(2024, 2, 1));
        assert_eq!(o.end, d(2024, 2, 1));
        assert_eq!(o.days, 1);
    }

    #[test]
    fn test_contained_range() {
        let o = overlap(d(2024, 1, 5), d(2024, 4, 4), d(2024, 2, 1), d(2024, 2, 10)).unwrap();
        assert_eq!((o.start, o.end, o.days), (d(2024, 2, 1), d(2024, 2, 10), 10));
    }

    #[test]
    fn test_partial_overlap() {
        let o = overlap(d(2024, 3, 15), d(2025, 3, 14), d(2024, 1, 5), d(2024, 4, 4)).unwrap();
        assert_eq!((o.start, o.end), (d(2024, 3, 15), d(2024, 4, 4)));
        assert_eq!(o.days, 21);
    }

    #[test]
    fn test_span_across_leap_day() {
        // Feb 2024 has 29 days
        assert_eq!(span_days(d(2024, 2, 1), d(2024, 3, 1)), 30);
        assert_eq!(span_days(d(2023, 2, 1), d(2023, 3, 1)), 29);
        // Full leap year
        assert_eq!(span_days(d(2024, 1, 5), d(2025, 1, 4)), 366);
        assert_eq!(span_days(d(2023, 1, 5), d(2024, 1, 4)), 365);
    }

    #[test]
    fn test_self_overlap_is_full_length() {
        let (s, e) = (d(2024, 10, 5), d(2025, 1, 4));
        let o = overlap(s, e, s, e).unwrap();
        assert_eq!(o.days, span_days(s, e));
    }
}

/// Database models for Meterdesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles, lock/confirmation flags, token columns
/// - `project`: User-owned projects with their own refresh-token realm
/// - `service`: Catalog templates and project-attached metered instances
/// - `history`: Append-only usage ledger entries
/// - `contact`: Lead-capture records from the contact form
/// - `documentation`: Site documentation content
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

pub mod contact;
pub mod documentation;
pub mod history;
pub mod project;
pub mod service;
pub mod user;

/// Inclusive calendar-date filter for listing queries
///
/// Callers pass the start and end dates they see on a date picker. The end
/// date is advanced by one day and the query compares with a half-open
/// interval (`created_at >= start AND created_at < end`), so rows created
/// any time on the end date are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,

    /// Exclusive upper bound (one day past the requested end date)
    pub end_exclusive: DateTime<Utc>,
}

impl DateRange {
    /// Builds a range from inclusive calendar dates
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        let start = start.and_time(NaiveTime::MIN).and_utc();
        let end_exclusive = (end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

        Self {
            start,
            end_exclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_includes_full_end_date() {
        let range = DateRange::inclusive(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        );

        let late_on_end_date = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        assert!(late_on_end_date >= range.start);
        assert!(late_on_end_date < range.end_exclusive);

        let next_day = NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert!(next_day >= range.end_exclusive);
    }

    #[test]
    fn test_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let range = DateRange::inclusive(day, day);

        assert_eq!(range.end_exclusive - range.start, Duration::days(1));
    }
}

//! Reference date arithmetic

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Date format used in hub files and output names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The reference date a forecast made on `today` belongs to: the next
/// Saturday, counting `today` itself.
pub fn reference_date_from_today(today: NaiveDate) -> NaiveDate {
    let saturday = Weekday::Sat.num_days_from_monday() as i64;
    let weekday = today.weekday().num_days_from_monday() as i64;
    today + Duration::days((saturday - weekday).rem_euclid(7))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-10-28", "2024-11-02")] // Monday
    #[case("2024-10-31", "2024-11-02")] // Thursday
    #[case("2024-11-01", "2024-11-02")] // Friday
    #[case("2024-11-02", "2024-11-02")] // Saturday
    #[case("2024-11-03", "2024-11-09")] // Sunday
    #[case("2024-12-30", "2025-01-04")]
    fn test_reference_date_from_today(#[case] today: &str, #[case] expected: &str) {
        let today = NaiveDate::parse_from_str(today, DATE_FORMAT).unwrap();
        assert_eq!(format_date(reference_date_from_today(today)), expected);
    }
}

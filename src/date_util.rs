use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.map_or(NaiveDate::MAX, |d| d - Duration::days(1))
}

/// Get the quarter (1-4) for a given date.
pub fn quarter_of(d: NaiveDate) -> u8 {
    ((d.month() - 1) / 3 + 1) as u8
}

/// Get the semester (1 = Jan-Jun, 2 = Jul-Dec) for a given date.
pub fn semester_of(d: NaiveDate) -> u8 {
    if d.month() <= 6 {
        1
    } else {
        2
    }
}

/// Midnight at the start of `d`.
pub fn start_of_day(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

/// The last whole second of `d` (23:59:59).
pub fn end_of_day(d: NaiveDate) -> NaiveDateTime {
    d.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| d.and_time(NaiveTime::MIN))
}

/// Elapsed time between two instants as fractional days.
pub fn fractional_days(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 86_400_000.0
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a timestamp the way the store keeps it.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts the canonical `T` separator, a space
/// separator, and an optional fractional-second suffix.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2025, 1),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
        assert_eq!(
            last_day_of_month(2025, 2),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        ); // Leap year
        assert_eq!(
            last_day_of_month(2025, 12),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_quarter_of() {
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()), 1);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()), 1);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), 2);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()), 2);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()), 3);
        assert_eq!(
            quarter_of(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()),
            4
        );
    }

    #[test]
    fn test_semester_of() {
        assert_eq!(
            semester_of(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            1
        );
        assert_eq!(semester_of(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()), 2);
    }

    #[test]
    fn test_fractional_days() {
        let a = parse_timestamp("2025-03-01T08:00:00").unwrap();
        let b = parse_timestamp("2025-03-02T20:00:00").unwrap();
        assert_eq!(fractional_days(a, b), 1.5);
        assert_eq!(fractional_days(b, a), -1.5);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-03-01T08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T08:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_day_bounds() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(format_timestamp(start_of_day(d)), "2025-06-30T00:00:00");
        assert_eq!(format_timestamp(end_of_day(d)), "2025-06-30T23:59:59");
    }
}

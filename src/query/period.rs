use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::date_util::{end_of_day, last_day_of_month, quarter_of, semester_of, start_of_day};
use crate::error::{Error, Result};

static RE_SEMESTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-[SsHh]([12])$").unwrap());
static RE_QUARTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-[Qq]([1-4])$").unwrap());
static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// Period type that drives window selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Quarter,
    Semester,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Semester => "semester",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" => Ok(Granularity::Month),
            "quarter" | "quarterly" => Ok(Granularity::Quarter),
            "semester" | "half" => Ok(Granularity::Semester),
            other => Err(Error::WindowParse(format!("unknown granularity: {other}"))),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reporting window: first day at 00:00:00 through last day at 23:59:59,
/// both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingWindow {
    pub key: String,
    pub granularity: Granularity,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportingWindow {
    fn from_months(
        granularity: Granularity,
        key: String,
        year: i32,
        first: u32,
        last: u32,
    ) -> Self {
        let first_day = NaiveDate::from_ymd_opt(year, first, 1).unwrap_or(NaiveDate::MIN);
        Self {
            key,
            granularity,
            start: start_of_day(first_day),
            end: end_of_day(last_day_of_month(year, last)),
        }
    }

    fn month_unchecked(year: i32, month: u32) -> Self {
        Self::from_months(
            Granularity::Month,
            format!("{year}-{month:02}"),
            year,
            month,
            month,
        )
    }

    fn quarter_unchecked(year: i32, q: u8) -> Self {
        let first = (q as u32 - 1) * 3 + 1;
        Self::from_months(
            Granularity::Quarter,
            format!("{year}-Q{q}"),
            year,
            first,
            first + 2,
        )
    }

    fn semester_unchecked(year: i32, s: u8) -> Self {
        let (first, last) = if s == 1 { (1, 6) } else { (7, 12) };
        Self::from_months(
            Granularity::Semester,
            format!("{year}-S{s}"),
            year,
            first,
            last,
        )
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(Error::WindowParse(format!("month out of range: {month}")));
        }
        Ok(Self::month_unchecked(year, month))
    }

    pub fn quarter(year: i32, q: u8) -> Result<Self> {
        check_year(year)?;
        if !(1..=4).contains(&q) {
            return Err(Error::WindowParse(format!("quarter out of range: {q}")));
        }
        Ok(Self::quarter_unchecked(year, q))
    }

    pub fn semester(year: i32, s: u8) -> Result<Self> {
        check_year(year)?;
        if !(1..=2).contains(&s) {
            return Err(Error::WindowParse(format!("semester out of range: {s}")));
        }
        Ok(Self::semester_unchecked(year, s))
    }

    /// Parse an explicit window key.
    ///
    /// Supported formats:
    /// - `2025-03`: month
    /// - `2025-Q2`: quarter
    /// - `2025-S1` or `2025-H1`: semester
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(caps) = RE_SEMESTER.captures(s) {
            let year = parse_year(&caps[1])?;
            let half: u8 = caps[2].parse().map_err(|_| bad_key(s))?;
            return Self::semester(year, half);
        }

        if let Some(caps) = RE_QUARTER.captures(s) {
            let year = parse_year(&caps[1])?;
            let q: u8 = caps[2].parse().map_err(|_| bad_key(s))?;
            return Self::quarter(year, q);
        }

        if let Some(caps) = RE_MONTH.captures(s) {
            let year = parse_year(&caps[1])?;
            let month: u32 = caps[2].parse().map_err(|_| bad_key(s))?;
            return Self::month(year, month);
        }

        Err(bad_key(s))
    }

    pub fn to_key(&self) -> &str {
        &self.key
    }

    /// Inclusive containment on both ends.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Date-level containment, for date-only columns such as next maintenance.
    pub fn contains_date(&self, d: NaiveDate) -> bool {
        d >= self.start.date() && d <= self.end.date()
    }
}

impl std::fmt::Display for ReportingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} .. {})",
            self.key,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Choose the reporting window for `granularity` as of `now`.
///
/// Months always report the current, possibly partial, month. Quarters and
/// semesters report the current window only in its last month or when it is
/// the first window of the year; otherwise they report the previous window
/// of the same year.
pub fn resolve_window(granularity: Granularity, now: NaiveDateTime) -> ReportingWindow {
    let today = now.date();
    let year = today.year();
    let month = today.month();

    match granularity {
        Granularity::Month => ReportingWindow::month_unchecked(year, month),
        Granularity::Quarter => {
            let q = quarter_of(today);
            let last_month_of_quarter = month % 3 == 0;
            if last_month_of_quarter || q == 1 {
                ReportingWindow::quarter_unchecked(year, q)
            } else {
                ReportingWindow::quarter_unchecked(year, q - 1)
            }
        }
        Granularity::Semester => {
            let s = semester_of(today);
            let last_month_of_semester = month == 6 || month == 12;
            if last_month_of_semester || s == 1 {
                ReportingWindow::semester_unchecked(year, s)
            } else {
                ReportingWindow::semester_unchecked(year, 1)
            }
        }
    }
}

/// The calendar semester containing `now`, with no fallback.
pub fn calendar_semester(now: NaiveDateTime) -> ReportingWindow {
    ReportingWindow::semester_unchecked(now.year(), semester_of(now.date()))
}

fn check_year(year: i32) -> Result<()> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(Error::WindowParse(format!("year out of range: {year}")))
    }
}

fn parse_year(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| Error::WindowParse(format!("invalid year: {s}")))
}

fn bad_key(s: &str) -> Error {
    Error::WindowParse(format!("unrecognized window: {s}"))
}

//! Reading and writing the two date conventions found in the rosters:
//! `DD-Mon` (column headers) and `DD-Mon[-YYYY]` (enrollment fields).

use chrono::{Datelike, NaiveDate, Weekday};
use snafu::prelude::*;

use crate::config::{ReconcileRules, END_DATE_NOT_APPLICABLE};

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[snafu(display("empty date"))]
    Empty {},
    #[snafu(display("end date marked as not applicable"))]
    NotApplicable {},
    #[snafu(display("expected DD-Mon or DD-Mon-YYYY, got {text:?}"))]
    Malformed { text: String },
    #[snafu(display("unknown month abbreviation {month:?}"))]
    UnknownMonth { month: String },
    #[snafu(display("invalid day {day:?}"))]
    InvalidDay { day: String },
    #[snafu(display("invalid year {year:?}"))]
    InvalidYear { year: String },
    #[snafu(display("no such date: {day}-{month}-{year}"))]
    OutOfRange { day: u32, month: u32, year: i32 },
}

/// Which of the two conventions to expect.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DateMode {
    /// `DD-Mon`, in the reporting year.
    Short,
    /// `DD-Mon` or `DD-Mon-YYYY`, defaulting to the current year.
    Flexible,
}

pub fn parse_date(
    text: &str,
    mode: DateMode,
    rules: &ReconcileRules,
) -> Result<NaiveDate, DateParseError> {
    match mode {
        DateMode::Short => parse_short(text, rules.reporting_year),
        DateMode::Flexible => parse_flexible(text, rules.current_year),
    }
}

/// Parses `DD-Mon`. Anything after the month is ignored.
pub fn parse_short(text: &str, year: i32) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    ensure!(!text.is_empty(), EmptySnafu {});
    let mut parts = text.split('-');
    match (parts.next(), parts.next()) {
        (Some(day), Some(month)) => build_date(day, month, year),
        _ => MalformedSnafu { text }.fail(),
    }
}

/// Parses `DD-Mon` or `DD-Mon-YYYY`.
///
/// The "not applicable" sentinel is rejected like any other invalid input,
/// it never turns into a date.
pub fn parse_flexible(text: &str, default_year: i32) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();
    ensure!(!text.is_empty(), EmptySnafu {});
    ensure!(
        !text.eq_ignore_ascii_case(END_DATE_NOT_APPLICABLE),
        NotApplicableSnafu {}
    );
    let parts: Vec<&str> = text.split('-').collect();
    match parts.as_slice() {
        [day, month] => build_date(day, month, default_year),
        [day, month, year] => {
            let year = year.trim();
            let y = if !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()) {
                year.parse::<i32>().ok()
            } else {
                None
            };
            let y = y.context(InvalidYearSnafu { year })?;
            build_date(day, month, y)
        }
        _ => MalformedSnafu { text }.fail(),
    }
}

/// The fallback chain used for every enrollment date: flexible, then
/// flexible with spaces read as hyphens, then short.
///
/// On failure, the error of the first attempt is returned. Callers choose
/// their own default.
pub fn parse_lenient(text: &str, rules: &ReconcileRules) -> Result<NaiveDate, DateParseError> {
    parse_flexible(text, rules.current_year).or_else(|first| {
        let alt = text.split_whitespace().collect::<Vec<&str>>().join("-");
        parse_flexible(&alt, rules.current_year)
            .or_else(|_| parse_short(&alt, rules.reporting_year))
            .map_err(|_| first)
    })
}

/// `DD-Mon`, the inverse of `parse_short`.
pub fn format_short(date: &NaiveDate) -> String {
    date.format("%d-%b").to_string()
}

pub fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn build_date(day: &str, month: &str, year: i32) -> Result<NaiveDate, DateParseError> {
    let day = day.trim();
    ensure!(
        !day.is_empty() && day.len() <= 2 && day.chars().all(|c| c.is_ascii_digit()),
        InvalidDaySnafu { day }
    );
    let d: u32 = day.parse().ok().context(InvalidDaySnafu { day })?;
    let m = month_number(month.trim()).context(UnknownMonthSnafu {
        month: month.trim(),
    })?;
    NaiveDate::from_ymd_opt(year, m, d).context(OutOfRangeSnafu {
        day: d,
        month: m,
        year,
    })
}

fn month_number(abbr: &str) -> Option<u32> {
    let m = match abbr.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::*;
use crate::dates::parse_short;

static DATE_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-[A-Za-z]{3}").expect("valid regex"));

/// True for column headers starting with `DD-Mon`, such as `10-Jul` or
/// `10-Jul-2025`.
pub fn is_date_column(header: &str) -> bool {
    DATE_COLUMN.is_match(header.trim())
}

/// Collects the date columns of a student row into a chronological map.
///
/// Columns that look like dates but do not parse (`"45-Jul"`) are dropped
/// and reported. Columns are visited in sorted header order so that the warnings
/// are stable.
pub fn build_daily_attendance(
    row: &Row,
    rules: &ReconcileRules,
) -> (DailyAttendance, Vec<ReconcileWarning>) {
    let mut headers: Vec<&String> = row.keys().filter(|k| is_date_column(k)).collect();
    headers.sort();

    let mut res = DailyAttendance::new();
    let mut warnings: Vec<ReconcileWarning> = Vec::new();
    for header in headers {
        let cell = row.get(header).map(|s| s.as_str()).unwrap_or("");
        let date = match parse_short(header, rules.reporting_year) {
            Ok(date) => date,
            Err(e) => {
                warn!("build_daily_attendance: dropping column {:?}: {}", header, e);
                warnings.push(ReconcileWarning::DroppedDateColumn {
                    column: header.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let mark = AttendanceMark::from_cell(cell);
        debug!("build_daily_attendance: {} {:?} -> {:?}", date, cell, mark);
        if res.merge(date, mark) {
            warn!(
                "build_daily_attendance: column {:?} duplicates date {}",
                header, date
            );
            warnings.push(ReconcileWarning::DuplicateDateColumn {
                column: header.clone(),
                date,
            });
        }
    }
    if res.is_empty() {
        warnings.push(ReconcileWarning::EmptyAttendance);
    }
    (res, warnings)
}

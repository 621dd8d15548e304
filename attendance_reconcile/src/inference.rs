use chrono::NaiveDate;
use log::debug;

use crate::config::{AttendanceMark, DailyAttendance};
use crate::dates::is_weekend;

/// Marks as absent the unmarked weekend dates of `[inference_start, last_attended)`.
///
/// The rosters record attendance but leave missed weekend sessions blank.
/// A blank weekend is only a confirmed absence when the student attended
/// again later, so nothing at or after the last attendance is touched.
/// Recorded marks are never changed, which makes the operation idempotent.
pub fn infer_absences(
    attendance: &DailyAttendance,
    inference_start: NaiveDate,
    last_attended: Option<NaiveDate>,
) -> DailyAttendance {
    let last_attended = match last_attended {
        Some(d) => d,
        None => return attendance.clone(),
    };
    attendance
        .iter()
        .map(|(date, mark)| {
            let in_window = date >= inference_start && date < last_attended;
            if in_window && mark == AttendanceMark::Unmarked && is_weekend(&date) {
                debug!("infer_absences: {} inferred absent", date);
                (date, AttendanceMark::Absent)
            } else {
                (date, mark)
            }
        })
        .collect()
}

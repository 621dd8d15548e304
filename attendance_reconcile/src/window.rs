use chrono::NaiveDate;
use log::debug;

use crate::config::*;
use crate::dates::is_weekend;

/// The cumulative attended / missed curve, one point per date in
/// chronological order.
pub fn attendance_trend(attendance: &DailyAttendance) -> Vec<TrendPoint> {
    attendance
        .iter()
        .scan((0u32, 0u32), |totals, (date, mark)| {
            let attended = u32::from(mark == AttendanceMark::Attended);
            let missed = u32::from(mark == AttendanceMark::Absent);
            totals.0 += attended;
            totals.1 += missed;
            Some(TrendPoint {
                date,
                attended,
                missed,
                cumulative_attended: totals.0,
                cumulative_missed: totals.1,
            })
        })
        .collect()
}

/// The reporting window of a student: from the configured start until the
/// cutoff, or a single day when there is no cutoff.
pub fn reporting_window(start: NaiveDate, cutoff: Option<NaiveDate>) -> ReportingWindow {
    ReportingWindow {
        start,
        end: cutoff.unwrap_or(start),
    }
}

/// Saturdays and Sundays of the inclusive range.
pub fn count_weekend_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(is_weekend)
        .count() as u32
}

/// Attended, absent and remaining sessions over the inclusive window.
///
/// Sessions are scheduled on the weekend days of the window. Marks recorded
/// on weekdays still count as attended or absent, and `remaining` never goes
/// below zero. An inverted window tallies to zero.
pub fn windowed_tally(attendance: &DailyAttendance, window: &ReportingWindow) -> WindowedTally {
    if window.end < window.start {
        debug!("windowed_tally: empty window {:?}", window);
        return WindowedTally::default();
    }
    let mut attended = 0u32;
    let mut absent = 0u32;
    for (date, mark) in attendance.iter() {
        if date < window.start || date > window.end {
            continue;
        }
        match mark {
            AttendanceMark::Attended => attended += 1,
            AttendanceMark::Absent => absent += 1,
            AttendanceMark::Unmarked => {}
        }
    }
    let weekend_days = count_weekend_days(window.start, window.end);
    WindowedTally {
        attended,
        absent,
        remaining: weekend_days.saturating_sub(attended + absent),
        weekend_days,
    }
}

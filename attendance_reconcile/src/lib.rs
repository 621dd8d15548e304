mod config;
pub mod attendance;
pub mod dates;
pub mod entitlement;
pub mod inference;
pub mod manual;
pub mod roster;
pub mod window;

use chrono::NaiveDate;
use log::{debug, info, warn};

pub use crate::config::*;
use crate::dates::parse_lenient;

/// Reconciles the attendance of one student.
///
/// Arguments:
/// * `row` the row of the student in the attendance table
/// * `roster` the roster table, used to find the date of joining
/// * `rules` the reporting constants
///
/// This never fails: every missing or unreadable field falls back to a
/// default and is listed in the warnings of the record.
pub fn reconcile_student(row: &Row, roster: &[Row], rules: &ReconcileRules) -> ReconciledRecord {
    let profile = read_profile(row);
    info!("Reconciling attendance of {:?}", profile.name);

    let (raw_attendance, mut warnings) = attendance::build_daily_attendance(row, rules);
    let enrollment = enrollment_window(&profile, &raw_attendance, rules, &mut warnings);
    debug!("reconcile_student: enrollment {:?}", enrollment);

    let clipped = match enrollment.cutoff {
        Some(cutoff) => raw_attendance.clipped(cutoff),
        None => raw_attendance,
    };
    let daily_attendance =
        inference::infer_absences(&clipped, rules.inference_start, clipped.last_attended());
    let last_attended_date = daily_attendance.last_attended();

    let attendance_trend = window::attendance_trend(&daily_attendance);
    let reporting_window = window::reporting_window(rules.inference_start, enrollment.cutoff);
    let windowed_tally = window::windowed_tally(&daily_attendance, &reporting_window);

    let historical = read_counter(row, HISTORICAL_CLASS_COUNT, &mut warnings);
    let attended_to_date = read_counter(row, CLASSES_ATTENDED_TO_DATE, &mut warnings);
    let entitlement =
        entitlement::resolve_entitlement(&profile.package_name, historical, attended_to_date);
    if entitlement.source == EntitlementSource::CounterSum {
        warnings.push(ReconcileWarning::EntitlementUndetermined {
            package: profile.package_name.clone(),
        });
    }

    let attendance_percentage =
        attendance_percentage(entitlement.attended_to_date, entitlement.total_classes);
    let status = classify(attendance_percentage, rules);
    let date_of_joining =
        roster::find_joining_date(roster, &profile.name, &profile.course_category);
    if date_of_joining.is_none() {
        debug!("reconcile_student: {:?} not in roster", profile.name);
    }

    info!(
        "{}: {} / {} classes ({}%, {}), window {:?}",
        profile.name,
        entitlement.attended_to_date,
        entitlement.total_classes,
        attendance_percentage,
        status.label(),
        windowed_tally
    );

    ReconciledRecord {
        profile,
        daily_attendance,
        attendance_trend,
        reporting_window,
        windowed_tally,
        enrollment,
        entitlement,
        attendance_percentage,
        last_attended_date,
        status,
        date_of_joining,
        warnings,
    }
}

/// Reconciles every row of the attendance table.
///
/// The students are independent of each other.
pub fn reconcile_all(rows: &[Row], roster: &[Row], rules: &ReconcileRules) -> Vec<ReconciledRecord> {
    info!("Processing {} students", rows.len());
    rows.iter()
        .map(|row| reconcile_student(row, roster, rules))
        .collect()
}

/// `attended / total` as a percentage rounded to two decimals, 0 when the
/// total is unknown.
pub fn attendance_percentage(attended: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = attended as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

pub fn classify(percentage: f64, rules: &ReconcileRules) -> AttendanceStatus {
    if percentage >= rules.excellent_threshold {
        AttendanceStatus::Excellent
    } else if percentage >= rules.good_threshold {
        AttendanceStatus::Good
    } else {
        AttendanceStatus::NeedsImprovement
    }
}

/// The enrollment window of a student.
///
/// The cutoff is the `End Date` when there is a readable one, otherwise the
/// last attended date. It is never before the start date.
pub fn enrollment_window(
    profile: &StudentProfile,
    attendance: &DailyAttendance,
    rules: &ReconcileRules,
    warnings: &mut Vec<ReconcileWarning>,
) -> EnrollmentWindow {
    let start = match parse_lenient(&profile.start_date, rules) {
        Ok(d) => Some(d),
        Err(dates::DateParseError::Empty {}) => None,
        Err(e) => {
            warn!("Start date {:?}: {}", profile.start_date, e);
            warnings.push(ReconcileWarning::InvalidStartDate {
                value: profile.start_date.clone(),
                reason: e.to_string(),
            });
            None
        }
    };

    let end = match parse_lenient(&profile.end_date, rules) {
        Ok(d) => Some(d),
        Err(dates::DateParseError::Empty {}) | Err(dates::DateParseError::NotApplicable {}) => {
            None
        }
        Err(e) => {
            warn!("End date {:?}: {}", profile.end_date, e);
            warnings.push(ReconcileWarning::InvalidEndDate {
                value: profile.end_date.clone(),
                reason: e.to_string(),
            });
            None
        }
    };

    let cutoff: Option<NaiveDate> = end.or_else(|| attendance.last_attended());
    let cutoff = match (cutoff, start) {
        (Some(c), Some(s)) if c < s => {
            warn!("Cutoff {} before start {}", c, s);
            warnings.push(ReconcileWarning::CutoffBeforeStart {
                cutoff: c,
                start: s,
            });
            Some(s)
        }
        (c, _) => c,
    };
    EnrollmentWindow { start, cutoff }
}

fn field<'a>(row: &'a Row, name: &str) -> &'a str {
    row.get(name).map(|s| s.trim()).unwrap_or("")
}

fn read_profile(row: &Row) -> StudentProfile {
    StudentProfile {
        serial_number: field(row, SERIAL_NUMBER).to_string(),
        name: field(row, STUDENT_NAME).to_string(),
        course_category: field(row, COURSE_CATEGORY).to_string(),
        package_name: field(row, PACKAGE_NAME).to_string(),
        start_date: field(row, START_DATE).to_string(),
        end_date: field(row, END_DATE).to_string(),
    }
}

fn read_counter(row: &Row, name: &str, warnings: &mut Vec<ReconcileWarning>) -> u32 {
    let value = field(row, name);
    match entitlement::parse_counter(value) {
        Some(x) => x,
        None => {
            warn!("Counter {:?} has invalid value {:?}", name, value);
            warnings.push(ReconcileWarning::InvalidCounter {
                field: name.to_string(),
                value: value.to_string(),
            });
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rules() -> ReconcileRules {
        ReconcileRules {
            current_year: 2025,
            ..ReconcileRules::default()
        }
    }

    fn student(end_date: &str) -> Row {
        row(&[
            ("Sr No.", "1"),
            ("Student Name", "Asha Rao"),
            ("Course Category", "Piano"),
            ("Package Name", "Piano Grade 2 - 20 classes"),
            ("Start Date", "01-Jul-2025"),
            ("End Date", end_date),
            ("Historical Class Count", "4"),
            ("Classes Attended to-date", "16"),
            ("05-Jul", "1"),
            ("12-Jul", "1"),
            ("13-Jul", ""),
            ("19-Jul", "1"),
            ("20-Jul", ""),
            ("26-Jul", "1"),
            ("27-Jul", ""),
            ("02-Aug", ""),
        ])
    }

    fn roster() -> Vec<Row> {
        vec![row(&[
            ("CompositeKey", "AshaRaoPiano"),
            ("Date of Joining", "3/14/2025"),
        ])]
    }

    #[test]
    fn percentage_and_status() {
        let r = rules();
        assert_eq!(attendance_percentage(16, 20), 80.0);
        assert_eq!(classify(80.0, &r), AttendanceStatus::Excellent);
        assert_eq!(attendance_percentage(2, 3), 66.67);
        assert_eq!(classify(66.67, &r), AttendanceStatus::Good);
        assert_eq!(classify(59.99, &r), AttendanceStatus::NeedsImprovement);
        assert_eq!(attendance_percentage(5, 0), 0.0);
    }

    #[test]
    fn open_ended_package_cuts_at_last_attendance() {
        init_logs();
        let rec = reconcile_student(&student("End Date Not Applicable"), &roster(), &rules());
        assert_eq!(rec.enrollment.cutoff, Some(d(7, 26)));
        assert_eq!(rec.last_attended_date, Some(d(7, 26)));
        // 27-Jul and 02-Aug are after the cutoff.
        assert_eq!(rec.daily_attendance.len(), 6);
        assert_eq!(rec.daily_attendance.get(&d(7, 27)), None);
        assert_eq!(rec.daily_attendance.get(&d(7, 13)), Some(AttendanceMark::Absent));
        assert_eq!(rec.daily_attendance.get(&d(7, 20)), Some(AttendanceMark::Absent));
        // Before the inference start, blank or not, nothing is inferred.
        assert_eq!(rec.daily_attendance.get(&d(7, 5)), Some(AttendanceMark::Attended));

        assert_eq!(rec.reporting_window.start, d(7, 10));
        assert_eq!(rec.reporting_window.end, d(7, 26));
        let t = rec.windowed_tally;
        assert_eq!((t.attended, t.absent, t.remaining), (3, 2, 0));
        assert_eq!(t.weekend_days, 5);
        assert_eq!(t.attended + t.absent + t.remaining, t.weekend_days);

        assert_eq!(rec.total_classes(), 20);
        assert_eq!(rec.attended_to_date(), 16);
        assert_eq!(rec.attendance_percentage, 80.0);
        assert_eq!(rec.status, AttendanceStatus::Excellent);
        assert_eq!(rec.date_of_joining, Some("3/14/2025".to_string()));
        assert!(rec.warnings.is_empty());

        let last = rec.attendance_trend.last().unwrap();
        assert_eq!(last.cumulative_attended, 4);
        assert_eq!(last.cumulative_missed, 2);
    }

    #[test]
    fn end_date_clips_and_extends_window() {
        let rec = reconcile_student(&student("02-Aug-2025"), &[], &rules());
        assert_eq!(rec.enrollment.cutoff, Some(d(8, 2)));
        assert_eq!(rec.daily_attendance.len(), 8);
        // After the last attendance, blanks stay blank.
        assert_eq!(rec.daily_attendance.get(&d(7, 27)), Some(AttendanceMark::Unmarked));
        let t = rec.windowed_tally;
        assert_eq!(t.weekend_days, 7);
        assert_eq!((t.attended, t.absent, t.remaining), (3, 2, 2));
        assert_eq!(rec.date_of_joining, None);
    }

    #[test]
    fn unreadable_end_date_falls_back() {
        let rec = reconcile_student(&student("someday"), &roster(), &rules());
        assert_eq!(rec.enrollment.cutoff, Some(d(7, 26)));
        assert!(matches!(
            rec.warnings.as_slice(),
            [ReconcileWarning::InvalidEndDate { .. }]
        ));
    }

    #[test]
    fn end_before_start_clamps() {
        let mut r = student("20-Jun-2025");
        r.insert("Start Date".to_string(), "12-Jul-2025".to_string());
        let rec = reconcile_student(&r, &roster(), &rules());
        assert_eq!(rec.enrollment.cutoff, Some(d(7, 12)));
        assert_eq!(rec.daily_attendance.last_attended(), Some(d(7, 12)));
        assert!(rec
            .warnings
            .iter()
            .any(|w| matches!(w, ReconcileWarning::CutoffBeforeStart { .. })));
    }

    #[test]
    fn unknown_entitlement_uses_counters() {
        let mut r = student("");
        r.insert("Package Name".to_string(), "Monthly".to_string());
        let rec = reconcile_student(&r, &roster(), &rules());
        assert_eq!(rec.total_classes(), 20);
        assert_eq!(rec.entitlement.source, EntitlementSource::CounterSum);
    }

    #[test]
    fn zero_total_does_not_divide() {
        let r = row(&[("Student Name", "Ravi"), ("Package Name", "Trial")]);
        let rec = reconcile_student(&r, &[], &rules());
        assert_eq!(rec.total_classes(), 0);
        assert_eq!(rec.attendance_percentage, 0.0);
        assert_eq!(rec.status, AttendanceStatus::NeedsImprovement);
        assert!(rec.daily_attendance.is_empty());
        assert!(rec.warnings.contains(&ReconcileWarning::EmptyAttendance));
        assert_eq!(rec.enrollment.cutoff, None);
        assert_eq!(rec.windowed_tally, WindowedTally::default());
    }

    #[test]
    fn bad_counters_default_to_zero() {
        let mut r = student("");
        r.insert("Historical Class Count".to_string(), "n/a".to_string());
        let rec = reconcile_student(&r, &[], &rules());
        assert_eq!(rec.attended_to_date(), 16);
        assert!(rec.warnings.contains(&ReconcileWarning::InvalidCounter {
            field: "Historical Class Count".to_string(),
            value: "n/a".to_string(),
        }));
    }

    #[test]
    fn batch_is_per_student() {
        let rows = vec![student(""), row(&[("Student Name", "Ravi")])];
        let recs = reconcile_all(&rows, &roster(), &rules());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].profile.name, "Asha Rao");
        assert_eq!(recs[1].date_of_joining, None);
    }
}

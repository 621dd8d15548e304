// ********* Input data structures ***********

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use chrono::{Datelike, Local, NaiveDate};

/// One row of a source table, keyed by the header of each column.
///
/// Missing cells are expected to be present as empty strings, but every
/// accessor in this crate also tolerates absent keys.
pub type Row = HashMap<String, String>;

// Column names of the attendance table.
pub const SERIAL_NUMBER: &str = "Sr No.";
pub const STUDENT_NAME: &str = "Student Name";
pub const COURSE_CATEGORY: &str = "Course Category";
pub const PACKAGE_NAME: &str = "Package Name";
pub const START_DATE: &str = "Start Date";
pub const END_DATE: &str = "End Date";
pub const HISTORICAL_CLASS_COUNT: &str = "Historical Class Count";
pub const CLASSES_ATTENDED_TO_DATE: &str = "Classes Attended to-date";

// Column names of the roster table.
pub const COMPOSITE_KEY: &str = "CompositeKey";
pub const DATE_OF_JOINING: &str = "Date of Joining";

/// Sentinel written in the `End Date` column for open-ended packages.
pub const END_DATE_NOT_APPLICABLE: &str = "end date not applicable";
pub const NOT_FOUND: &str = "Not Found";
pub const NO_ATTENDANCE_RECORDED: &str = "No attendance recorded";

/// The canonical state of one calendar date for one student.
///
/// The ordering is meaningful: when two columns collapse onto the same
/// date, the greater mark wins.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AttendanceMark {
    /// Nothing was recorded for this date.
    Unmarked,
    /// A recorded or inferred absence.
    Absent,
    Attended,
}

impl AttendanceMark {
    /// Maps a raw roster cell onto a mark.
    ///
    /// `"1"` is an attendance, a blank cell is unmarked and anything else
    /// (`"X"`, `"0"`, free text) is a recorded absence.
    pub fn from_cell(cell: &str) -> AttendanceMark {
        match cell.trim() {
            "1" => AttendanceMark::Attended,
            "" => AttendanceMark::Unmarked,
            _ => AttendanceMark::Absent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceMark::Unmarked => "unmarked",
            AttendanceMark::Absent => "absent",
            AttendanceMark::Attended => "attended",
        }
    }
}

// ******** Intermediate data structures *********

/// The attendance of one student, ordered chronologically.
///
/// Keys are calendar dates, never the raw column headers, so that iteration
/// order is always the order of the calendar.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DailyAttendance {
    marks: BTreeMap<NaiveDate, AttendanceMark>,
}

impl DailyAttendance {
    pub fn new() -> DailyAttendance {
        DailyAttendance::default()
    }

    /// Inserts a mark, keeping the greater one if the date is already present.
    /// Returns true if the date was already present.
    pub fn merge(&mut self, date: NaiveDate, mark: AttendanceMark) -> bool {
        match self.marks.get_mut(&date) {
            Some(existing) => {
                *existing = (*existing).max(mark);
                true
            }
            None => {
                self.marks.insert(date, mark);
                false
            }
        }
    }

    pub fn get(&self, date: &NaiveDate) -> Option<AttendanceMark> {
        self.marks.get(date).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, AttendanceMark)> + '_ {
        self.marks.iter().map(|(d, m)| (*d, *m))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn count(&self, mark: AttendanceMark) -> usize {
        self.marks.values().filter(|m| **m == mark).count()
    }

    /// The latest date carrying an attendance, if any.
    pub fn last_attended(&self) -> Option<NaiveDate> {
        self.marks
            .iter()
            .rev()
            .find(|(_, m)| **m == AttendanceMark::Attended)
            .map(|(d, _)| *d)
    }

    /// Drops every date strictly after the cutoff.
    pub fn clipped(&self, cutoff: NaiveDate) -> DailyAttendance {
        self.marks
            .range(..=cutoff)
            .map(|(d, m)| (*d, *m))
            .collect()
    }
}

impl FromIterator<(NaiveDate, AttendanceMark)> for DailyAttendance {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, AttendanceMark)>>(iter: I) -> Self {
        let mut res = DailyAttendance::new();
        for (date, mark) in iter {
            res.merge(date, mark);
        }
        res
    }
}

/// The period a student is enrolled for.
///
/// Either bound may be missing when the source data does not allow to
/// determine it. When both are present, `cutoff >= start`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct EnrollmentWindow {
    pub start: Option<NaiveDate>,
    pub cutoff: Option<NaiveDate>,
}

/// The fixed window used for the attended/absent/remaining tally.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ReportingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EntitlementSource {
    /// Read from the package description.
    Package,
    /// Historical class count plus classes attended to date.
    CounterSum,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Entitlement {
    /// Zero means the entitlement could not be determined.
    pub total_classes: u32,
    pub attended_to_date: u32,
    pub source: EntitlementSource,
}

// ******** Output data structures *********

/// One point of the cumulative attendance curve.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub attended: u32,
    pub missed: u32,
    pub cumulative_attended: u32,
    pub cumulative_missed: u32,
}

/// Attended / absent / remaining sessions over the reporting window.
///
/// `remaining = max(weekend_days - attended - absent, 0)`, so
/// `attended + absent + remaining == weekend_days` unless more sessions were
/// marked than scheduled.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct WindowedTally {
    pub attended: u32,
    pub absent: u32,
    pub remaining: u32,
    /// Saturdays and Sundays in the window: the scheduled sessions.
    pub weekend_days: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AttendanceStatus {
    Excellent,
    Good,
    NeedsImprovement,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Excellent => "Excellent",
            AttendanceStatus::Good => "Good",
            AttendanceStatus::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Descriptive fields copied from the attendance table.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct StudentProfile {
    pub serial_number: String,
    pub name: String,
    pub course_category: String,
    pub package_name: String,
    pub start_date: String,
    pub end_date: String,
}

/// Conditions that degraded the computation of a record without stopping it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReconcileWarning {
    /// A date-like column whose header could not be read as a date.
    DroppedDateColumn { column: String, reason: String },
    /// Two columns normalized to the same calendar date.
    DuplicateDateColumn { column: String, date: NaiveDate },
    InvalidStartDate { value: String, reason: String },
    InvalidEndDate { value: String, reason: String },
    CutoffBeforeStart { cutoff: NaiveDate, start: NaiveDate },
    /// Nothing numeric in the package text, the counters were summed instead.
    EntitlementUndetermined { package: String },
    InvalidCounter { field: String, value: String },
    /// The student row has no date column at all.
    EmptyAttendance,
}

impl Display for ReconcileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileWarning::DroppedDateColumn { column, reason } => {
                write!(f, "dropped date column {:?}: {}", column, reason)
            }
            ReconcileWarning::DuplicateDateColumn { column, date } => {
                write!(f, "column {:?} duplicates date {}", column, date)
            }
            ReconcileWarning::InvalidStartDate { value, reason } => {
                write!(f, "invalid start date {:?}: {}", value, reason)
            }
            ReconcileWarning::InvalidEndDate { value, reason } => {
                write!(f, "invalid end date {:?}: {}", value, reason)
            }
            ReconcileWarning::CutoffBeforeStart { cutoff, start } => {
                write!(f, "cutoff {} is before start {}, using start", cutoff, start)
            }
            ReconcileWarning::EntitlementUndetermined { package } => {
                write!(f, "no class count in package {:?}", package)
            }
            ReconcileWarning::InvalidCounter { field, value } => {
                write!(f, "invalid counter {:?} in field {:?}", value, field)
            }
            ReconcileWarning::EmptyAttendance => write!(f, "no attendance columns"),
        }
    }
}

/// The reconciled attendance of one student.
#[derive(PartialEq, Debug, Clone)]
pub struct ReconciledRecord {
    pub profile: StudentProfile,
    /// After clipping to the cutoff and inferring absences.
    pub daily_attendance: DailyAttendance,
    pub attendance_trend: Vec<TrendPoint>,
    pub reporting_window: ReportingWindow,
    pub windowed_tally: WindowedTally,
    pub enrollment: EnrollmentWindow,
    pub entitlement: Entitlement,
    pub attendance_percentage: f64,
    pub last_attended_date: Option<NaiveDate>,
    pub status: AttendanceStatus,
    /// As found in the roster, `None` when the student is not listed.
    pub date_of_joining: Option<String>,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReconciledRecord {
    pub fn total_classes(&self) -> u32 {
        self.entitlement.total_classes
    }

    pub fn attended_to_date(&self) -> u32 {
        self.entitlement.attended_to_date
    }
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone)]
pub struct ReconcileRules {
    /// Year given to `DD-Mon` column headers.
    pub reporting_year: i32,
    /// Year given to flexible dates written without one.
    pub current_year: i32,
    /// Start of both the absence inference window and the reporting window.
    pub inference_start: NaiveDate,
    pub excellent_threshold: f64,
    pub good_threshold: f64,
}

impl ReconcileRules {
    pub const DEFAULT_REPORTING_YEAR: i32 = 2025;

    /// Rules with the given reporting year, starting the inference on 10 July.
    pub fn for_reporting_year(reporting_year: i32) -> ReconcileRules {
        ReconcileRules {
            reporting_year,
            current_year: Local::now().year(),
            inference_start: NaiveDate::from_ymd_opt(reporting_year, 7, 10)
                .unwrap_or(NaiveDate::MIN),
            excellent_threshold: 80.0,
            good_threshold: 60.0,
        }
    }
}

impl Default for ReconcileRules {
    fn default() -> Self {
        ReconcileRules::for_reporting_year(ReconcileRules::DEFAULT_REPORTING_YEAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    #[test]
    fn cells_map_onto_three_marks() {
        assert_eq!(AttendanceMark::from_cell("1"), AttendanceMark::Attended);
        assert_eq!(AttendanceMark::from_cell(" 1 "), AttendanceMark::Attended);
        assert_eq!(AttendanceMark::from_cell(""), AttendanceMark::Unmarked);
        assert_eq!(AttendanceMark::from_cell("  "), AttendanceMark::Unmarked);
        assert_eq!(AttendanceMark::from_cell("X"), AttendanceMark::Absent);
        assert_eq!(AttendanceMark::from_cell("0"), AttendanceMark::Absent);
    }

    #[test]
    fn iteration_is_chronological() {
        let att: DailyAttendance = vec![
            (d(8, 2), AttendanceMark::Attended),
            (d(7, 12), AttendanceMark::Absent),
            (d(7, 26), AttendanceMark::Unmarked),
        ]
        .into_iter()
        .collect();
        let dates: Vec<NaiveDate> = att.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![d(7, 12), d(7, 26), d(8, 2)]);
    }

    #[test]
    fn merge_keeps_strongest_mark() {
        let mut att = DailyAttendance::new();
        assert!(!att.merge(d(7, 12), AttendanceMark::Unmarked));
        assert!(att.merge(d(7, 12), AttendanceMark::Attended));
        assert!(att.merge(d(7, 12), AttendanceMark::Absent));
        assert_eq!(att.get(&d(7, 12)), Some(AttendanceMark::Attended));
        assert_eq!(att.len(), 1);
    }

    #[test]
    fn last_attended_and_clip() {
        let att: DailyAttendance = vec![
            (d(7, 12), AttendanceMark::Attended),
            (d(7, 19), AttendanceMark::Attended),
            (d(7, 20), AttendanceMark::Absent),
            (d(7, 26), AttendanceMark::Unmarked),
        ]
        .into_iter()
        .collect();
        assert_eq!(att.last_attended(), Some(d(7, 19)));
        let clipped = att.clipped(d(7, 19));
        assert_eq!(clipped.len(), 2);
        assert_eq!(clipped.get(&d(7, 20)), None);
        assert_eq!(DailyAttendance::new().last_attended(), None);
    }

    #[test]
    fn default_rules() {
        let rules = ReconcileRules::default();
        assert_eq!(rules.reporting_year, 2025);
        assert_eq!(rules.inference_start, d(7, 10));
    }
}

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

use log::{debug, info, warn};

use attendance_reconcile::dates::{format_short, parse_lenient};
use attendance_reconcile::roster::format_joining_date;
use attendance_reconcile::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::{input_kind, InputKind};

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("No header row in {path}"))]
    EmptyTable { path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Missing {what}: use the command line or the config file"))]
    MissingInput { what: String },
    #[snafu(display("Invalid date {value:?} for {what}"))]
    InvalidDate { value: String, what: String },
    #[snafu(display("No student matches {query:?}"))]
    StudentNotFound { query: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The inputs of one run, after merging the command line with the config file.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub attendance_path: String,
    pub roster_path: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub student: Option<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub rules: ReconcileRules,
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let settings = build_settings(args)?;
    info!("settings: {:?}", settings);

    let rows = read_table(&settings.attendance_path, &settings)?;
    let roster = match &settings.roster_path {
        Some(p) => read_table(p, &settings)?,
        None => {
            warn!("No roster provided, dates of joining will not be found");
            Vec::new()
        }
    };

    let selected = select_students(&rows, settings.student.as_deref())?;
    let records = reconcile_all(&selected, &roster, &settings.rules);
    let summary = build_summary_js(&records);

    let pretty_js = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match settings.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js),
        Some(p) => {
            fs::write(p, &pretty_js).context(WritingOutputSnafu { path: p })?;
            info!("Summary written to {}", p);
        }
    }

    if let Some(reference_p) = &settings.reference {
        check_reference(&summary, reference_p)?;
    }
    Ok(())
}

/// Merges the command line arguments with the optional config file.
/// The command line wins.
pub fn build_settings(args: &Args) -> ReportResult<ReportSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, Some(root))
        }
        None => (ReportConfig::default(), None),
    };
    let resolve = |p: &String| -> String {
        match &root {
            Some(r) => {
                let full: PathBuf = [r.as_path(), Path::new(p)].iter().collect();
                full.display().to_string()
            }
            None => p.clone(),
        }
    };

    let attendance_path = match (&args.attendance, &config.attendance_file) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve(p),
        (None, None) => {
            return MissingInputSnafu {
                what: "attendance table",
            }
            .fail()
        }
    };
    let roster_path = args.roster.clone().or(config.roster_file.as_ref().map(resolve));
    let out = args.out.clone().or(config.output_file.as_ref().map(resolve));

    let reporting_year = args
        .reporting_year
        .or(config.reporting_year)
        .unwrap_or(ReconcileRules::DEFAULT_REPORTING_YEAR);
    let mut rules = ReconcileRules::for_reporting_year(reporting_year);
    if let Some(start) = args.inference_start.as_ref().or(config.inference_start.as_ref()) {
        rules.inference_start = parse_lenient(start, &rules).ok().context(InvalidDateSnafu {
            value: start,
            what: "inference start",
        })?;
    }

    Ok(ReportSettings {
        attendance_path,
        roster_path,
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or(config.excel_worksheet_name),
        student: args.student.clone(),
        out,
        reference: args.reference.clone(),
        rules,
    })
}

fn read_table(path: &str, settings: &ReportSettings) -> ReportResult<Vec<Row>> {
    info!("Attempting to read table {:?}", path);
    let rows = match input_kind(path) {
        InputKind::Excel => {
            io_excel::read_excel_table(path, settings.excel_worksheet_name.as_deref())?
        }
        InputKind::Csv => io_csv::read_csv_table(path)?,
    };
    debug!("read_table: {} rows in {:?}", rows.len(), path);
    Ok(rows)
}

/// The rows to report: all of them, or the first one whose serial number
/// is the query or whose name contains it, ignoring case.
pub fn select_students(rows: &[Row], query: Option<&str>) -> ReportResult<Vec<Row>> {
    let query = match query {
        None => return Ok(rows.to_vec()),
        Some(q) => q.trim(),
    };
    ensure!(!query.is_empty(), StudentNotFoundSnafu { query });
    let lowered = query.to_lowercase();
    let found = rows.iter().find(|r| {
        let serial = r.get(SERIAL_NUMBER).map(|s| s.trim()).unwrap_or("");
        let name = r.get(STUDENT_NAME).map(|s| s.to_lowercase()).unwrap_or_default();
        serial == query || name.contains(&lowered)
    });
    match found {
        Some(r) => Ok(vec![r.clone()]),
        None => StudentNotFoundSnafu { query }.fail(),
    }
}

fn record_to_json(rec: &ReconciledRecord) -> JSValue {
    let daily: Vec<JSValue> = rec
        .daily_attendance
        .iter()
        .map(|(date, mark)| json!({"date": format_short(&date), "mark": mark.as_str()}))
        .collect();

    let trend: Vec<JSValue> = rec
        .attendance_trend
        .iter()
        .map(|p| {
            json!({
                "date": format_short(&p.date),
                "attended": p.attended,
                "missed": p.missed,
                "cumulative": p.cumulative_attended,
                "cumulativeMissed": p.cumulative_missed
            })
        })
        .collect();

    let t = &rec.windowed_tally;
    let tally = json!({
        "attended": t.attended,
        "absent": t.absent,
        "remaining": t.remaining,
        "weekendDays": t.weekend_days
    });
    let window = json!({
        "start": rec.reporting_window.start.to_string(),
        "end": rec.reporting_window.end.to_string()
    });

    let date_of_joining = rec
        .date_of_joining
        .as_deref()
        .map(format_joining_date)
        .unwrap_or_else(|| NOT_FOUND.to_string());
    let last_attended = rec
        .last_attended_date
        .map(|d| format_short(&d))
        .unwrap_or_else(|| NO_ATTENDANCE_RECORDED.to_string());
    let warnings: Vec<String> = rec.warnings.iter().map(|w| w.to_string()).collect();

    let p = &rec.profile;
    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("srNo".to_string(), json!(p.serial_number));
    js.insert("studentName".to_string(), json!(p.name));
    js.insert("courseCategory".to_string(), json!(p.course_category));
    js.insert("packageName".to_string(), json!(p.package_name));
    js.insert("dateOfJoining".to_string(), json!(date_of_joining));
    js.insert("totalClasses".to_string(), json!(rec.total_classes()));
    js.insert(
        "classesAttendedToDate".to_string(),
        json!(rec.attended_to_date()),
    );
    js.insert(
        "attendancePercentage".to_string(),
        json!(rec.attendance_percentage),
    );
    js.insert("status".to_string(), json!(rec.status.label()));
    js.insert("lastAttendedDate".to_string(), json!(last_attended));
    js.insert(
        "cutoffDate".to_string(),
        json!(rec.enrollment.cutoff.map(|d| d.to_string())),
    );
    js.insert("reportingWindow".to_string(), window);
    js.insert("windowedTally".to_string(), tally);
    js.insert("dailyAttendance".to_string(), JSValue::Array(daily));
    js.insert("attendanceTrend".to_string(), JSValue::Array(trend));
    js.insert("warnings".to_string(), json!(warnings));
    JSValue::Object(js)
}

fn build_summary_js(records: &[ReconciledRecord]) -> JSValue {
    let students: Vec<JSValue> = records.iter().map(record_to_json).collect();
    json!({ "students": students })
}

/// Compares the summary with a reference summary and prints the differences.
fn check_reference(summary: &JSValue, reference_path: &str) -> ReportResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("Summary matches reference {}", reference_path);
    Ok(())
}

use crate::report::*;

use serde::{Deserialize, Serialize};

/// The optional JSON description of a run.
///
/// ```text
/// {
///   "attendanceFile": "attendance.csv",
///   "rosterFile": "roster.xlsx",
///   "reportingYear": 2025,
///   "inferenceStart": "10-Jul-2025"
/// }
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "attendanceFile")]
    pub attendance_file: Option<String>,
    #[serde(rename = "rosterFile")]
    pub roster_file: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "reportingYear")]
    pub reporting_year: Option<i32>,
    #[serde(rename = "inferenceStart")]
    pub inference_start: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

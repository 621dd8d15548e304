use clap::Parser;

/// This is a student attendance reconciliation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the inputs. Relative paths in this file are read
    /// from the directory of the file. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The attendance table, as a CSV or Excel (.xlsx) file. Setting this option overrides
    /// what may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub attendance: Option<String>,

    /// (file path, optional) The roster table with the dates of joining, as a CSV or Excel (.xlsx) file.
    #[clap(long, value_parser)]
    pub roster: Option<String>,

    /// (serial number or name, optional) Only report the first student whose serial number is this
    /// value, or whose name contains it. All the students are reported otherwise.
    #[clap(short, long, value_parser)]
    pub student: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided, the
    /// computed summary is checked against it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 2025) The year of the DD-Mon date columns.
    #[clap(long, value_parser)]
    pub reporting_year: Option<i32>,

    /// (default 10-Jul of the reporting year) The first date of the reporting period, DD-Mon-YYYY.
    #[clap(long, value_parser)]
    pub inference_start: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

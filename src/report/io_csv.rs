// Primitives for reading CSV files.

use crate::report::{io_common::assemble_rows, *};

/// Reads a CSV table whose first line is the header.
pub fn read_csv_table(path: &str) -> ReportResult<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    debug!("read_csv_table: header: {:?}", header);

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, line);
        records.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(assemble_rows(&header, records))
}

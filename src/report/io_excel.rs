use attendance_reconcile::dates::format_short;
use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use crate::report::{io_common::assemble_rows, *};

/// Reads a table from an Excel workbook, by default from its first worksheet.
pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> ReportResult<Vec<Row>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyTableSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyTableSnafu { path })?
        .iter()
        .map(read_header_cell)
        .collect();
    debug!("read_excel_table: header: {:?}", header);

    let records: Vec<Vec<String>> = iter
        .map(|row| row.iter().map(read_cell).collect())
        .collect();
    Ok(assemble_rows(&header, records))
}

/// Date-typed header cells become `DD-Mon` so that they are recognized as
/// attendance columns.
fn read_header_cell(cell: &DataType) -> String {
    match cell {
        DataType::DateTime(serial) => match excel_serial_to_date(*serial) {
            Some(d) => format_short(&d),
            None => serial.to_string(),
        },
        _ => read_cell(cell).trim().to_string(),
    }
}

fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => String::new(),
        // Marks typed as numbers: 1.0 must read as "1".
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(serial) => match excel_serial_to_date(*serial) {
            Some(d) => d.format("%d-%b-%Y").to_string(),
            None => serial.to_string(),
        },
        DataType::Error(e) => {
            warn!("read_cell: error cell {:?}", e);
            String::new()
        }
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}

/// Excel counts days from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_marks_read_as_text() {
        assert_eq!(read_cell(&DataType::Float(1.0)), "1");
        assert_eq!(read_cell(&DataType::Int(0)), "0");
        assert_eq!(read_cell(&DataType::Empty), "");
        assert_eq!(read_cell(&DataType::String("X".to_string())), "X");
    }

    #[test]
    fn date_headers() {
        // 45848 is 2025-07-10.
        assert_eq!(read_header_cell(&DataType::DateTime(45848.0)), "10-Jul");
        assert_eq!(
            read_header_cell(&DataType::String(" Student Name ".to_string())),
            "Student Name"
        );
        assert_eq!(
            read_cell(&DataType::DateTime(45848.0)),
            "10-Jul-2025".to_string()
        );
    }
}

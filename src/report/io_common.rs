use std::path::Path;

use attendance_reconcile::Row;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputKind {
    Csv,
    Excel,
}

/// Excel for `.xlsx` files, CSV for everything else.
pub fn input_kind(path: &str) -> InputKind {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") => InputKind::Excel,
        _ => InputKind::Csv,
    }
}

/// Pairs every record with the header row.
///
/// Missing cells are empty strings, cells beyond the header are dropped,
/// and so are the columns with a blank header. When a header appears twice,
/// the last column wins.
pub fn assemble_rows(header: &[String], records: Vec<Vec<String>>) -> Vec<Row> {
    records
        .into_iter()
        .map(|record| {
            let mut row = Row::new();
            for (idx, name) in header.iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                let cell = record.get(idx).cloned().unwrap_or_default();
                row.insert(name.clone(), cell);
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(input_kind("a/b/Attendance.XLSX"), InputKind::Excel);
        assert_eq!(input_kind("attendance.csv"), InputKind::Csv);
        assert_eq!(input_kind("attendance"), InputKind::Csv);
    }

    #[test]
    fn short_records_are_padded() {
        let header: Vec<String> = vec!["Student Name".into(), "".into(), "12-Jul".into()];
        let rows = assemble_rows(
            &header,
            vec![
                vec!["Asha Rao".into()],
                vec!["Ravi".into(), "x".into(), "1".into(), "extra".into()],
            ],
        );
        assert_eq!(rows[0].get("12-Jul").unwrap(), "");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].get("12-Jul").unwrap(), "1");
        assert_eq!(rows[1].len(), 2);
    }
}

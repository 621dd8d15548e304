use log::debug;

use crate::config::*;

/// Join key between the attendance table and the roster: name and course
/// category with all whitespace removed, lowercased.
pub fn composite_key(name: &str, category: &str) -> String {
    name.chars()
        .chain(category.chars())
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// The `Date of Joining` of the roster entry matching the student.
/// Blank dates count as missing.
pub fn find_joining_date(roster: &[Row], name: &str, category: &str) -> Option<String> {
    let key = composite_key(name, category);
    let found = roster
        .iter()
        .find(|r| {
            r.get(COMPOSITE_KEY)
                .map(|k| composite_key(k, "") == key)
                .unwrap_or(false)
        })
        .and_then(|r| r.get(DATE_OF_JOINING))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    debug!("find_joining_date: key {:?} -> {:?}", key, found);
    found
}

/// Renders a roster date written `M/D/YYYY` as `DD/MM/YYYY`.
/// Other shapes are returned unchanged.
pub fn format_joining_date(raw: &str) -> String {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match parts.as_slice() {
        [month, day, year] if numeric(*month) && numeric(*day) && numeric(*year) => {
            format!("{:0>2}/{:0>2}/{}", day, month, year)
        }
        _ => raw.to_string(),
    }
}

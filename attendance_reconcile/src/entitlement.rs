use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{Entitlement, EntitlementSource};

static NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static SESSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*sessions").expect("valid regex"));
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));

/// Reads the number of classes out of a free-text package label.
///
/// - mentions "classes": the last number of the label (`"Level 2 - 24 classes"` is 24)
/// - mentions "sessions": the number right before the word (`"8 sessions"` is 8)
/// - otherwise 0, meaning undetermined.
pub fn extract_total(package: &str) -> u32 {
    let lowered = package.to_lowercase();
    let found = if lowered.contains("classes") {
        NUMBERS
            .find_iter(package)
            .last()
            .and_then(|m| m.as_str().parse::<u32>().ok())
    } else if lowered.contains("sessions") {
        SESSIONS
            .captures(package)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    } else {
        None
    };
    debug!("extract_total: {:?} -> {:?}", package, found);
    found.unwrap_or(0)
}

/// The entitlement of a student, falling back to the counters when the
/// package label does not say.
pub fn resolve_entitlement(package: &str, historical: u32, attended_to_date: u32) -> Entitlement {
    match extract_total(package) {
        0 => Entitlement {
            total_classes: historical.saturating_add(attended_to_date),
            attended_to_date,
            source: EntitlementSource::CounterSum,
        },
        total => Entitlement {
            total_classes: total,
            attended_to_date,
            source: EntitlementSource::Package,
        },
    }
}

/// Reads a counter cell. Blank cells count as 0, leading digits are kept
/// (`"12 classes"` is 12). Returns `None` when nothing numeric leads the cell.
pub fn parse_counter(cell: &str) -> Option<u32> {
    if cell.trim().is_empty() {
        return Some(0);
    }
    LEADING_NUMBER
        .captures(cell)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

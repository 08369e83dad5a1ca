//! Small rendering helpers shared by list and detail output.

use chrono::NaiveDate;

/// Placeholder shown for absent values.
pub const PLACEHOLDER: &str = "—";

/// `DD/MM/YYYY`, or the placeholder when absent.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// True when a deadline exists and is strictly before `today`.
pub fn is_overdue(deadline: Option<NaiveDate>, today: NaiveDate) -> bool {
    deadline.is_some_and(|value| value < today)
}

/// The text itself, or the placeholder when blank.
pub fn display_text(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

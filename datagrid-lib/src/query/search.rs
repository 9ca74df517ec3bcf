//! Free-text search across every field of a row.

use crate::model::Row;

/// Returns `true` if any field's string form contains `term`, ignoring case.
///
/// A blank term matches every row. Null fields never match.
pub fn matches_search(row: &Row, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    row_contains(row, &term)
}

fn row_contains(row: &Row, lowered_term: &str) -> bool {
    row.fields().any(|(_, value)| {
        value
            .display_string()
            .is_some_and(|s| s.to_lowercase().contains(lowered_term))
    })
}

/// Keeps the rows matching `term`.
pub fn apply_search(rows: Vec<Row>, term: &str) -> Vec<Row> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows;
    }
    rows.into_iter().filter(|row| row_contains(row, &term)).collect()
}

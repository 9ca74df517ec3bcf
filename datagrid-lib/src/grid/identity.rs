//! Synthetic row identity.
//!
//! Rows are not required to carry a usable natural key, and callers' `id`
//! fields may be missing or repeated, so the grid never trusts them. An
//! identifier is the row's position in the current snapshot joined with a
//! digest of its serialized content. The position keeps structurally
//! identical rows apart; the digest keeps an identifier from resolving to a
//! different row after the snapshot changes.

use std::collections::HashMap;

use sha2::Digest;
use sha2::Sha256;

use crate::model::Row;

/// Serialized content beyond this many characters does not affect the id.
const CONTENT_PREFIX_CHARS: usize = 100;

/// Hex characters of the digest kept in the id.
const DIGEST_HEX_CHARS: usize = 16;

/// Computes the identifier of `row` at `index`.
///
/// # Example
///
/// ```
/// use datagrid_lib::grid::row_id;
/// use datagrid_lib::model::Row;
///
/// let row = Row::new().set("id", 1i64);
/// assert_eq!(row_id(&row, 0), row_id(&row.clone(), 0));
/// assert_ne!(row_id(&row, 0), row_id(&row, 1));
/// assert!(row_id(&row, 3).starts_with("3-"));
/// ```
pub fn row_id(row: &Row, index: usize) -> String {
    let json = serde_json::to_string(row).unwrap_or_default();
    let content: String = json.chars().take(CONTENT_PREFIX_CHARS).collect();
    let digest = Sha256::digest(content.as_bytes());
    let hex: String = digest
        .iter()
        .take(DIGEST_HEX_CHARS / 2)
        .map(|b| format!("{:02x}", b))
        .collect();
    format!("{}-{}", index, hex)
}

/// Identifiers for every row of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct RowIdentities {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RowIdentities {
    /// Assigns identifiers to a snapshot.
    pub fn assign(rows: &[Row]) -> Self {
        let ids: Vec<String> = rows.iter().enumerate().map(|(i, row)| row_id(row, i)).collect();
        let positions = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        Self { ids, positions }
    }

    /// Returns the identifier at `index`.
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Returns the snapshot position of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Returns all identifiers in snapshot order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the identifier of `row` within `rows`, the snapshot these
    /// identities were assigned to.
    ///
    /// The row is located by reference first, then by content. A row that is
    /// not part of the snapshot gets a random identifier that will not
    /// resolve.
    pub fn id_for(&self, rows: &[Row], row: &Row) -> String {
        let position = rows
            .iter()
            .position(|r| std::ptr::eq(r, row))
            .or_else(|| rows.iter().position(|r| r == row));

        match position.and_then(|i| self.id_at(i)) {
            Some(id) => id.to_string(),
            None => {
                log::warn!("Row not found in current snapshot, assigning a random id");
                uuid::Uuid::new_v4().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("id", 1i64).set("name", "Bob"),
            Row::new().set("id", 1i64).set("name", "Bob"),
            Row::new().set("id", 2i64).set("name", "Amy"),
        ]
    }

    #[test]
    fn test_identical_rows_get_distinct_ids() {
        let identities = RowIdentities::assign(&rows());
        assert_ne!(identities.id_at(0), identities.id_at(1));
        assert_eq!(identities.ids().len(), 3);
    }

    #[test]
    fn test_deterministic_per_snapshot() {
        let a = RowIdentities::assign(&rows());
        let b = RowIdentities::assign(&rows());
        assert_eq!(a.ids(), b.ids());
    }

    #[test]
    fn test_ignores_natural_id() {
        let x = Row::new().set("id", 7i64).set("name", "Bob");
        let y = Row::new().set("id", 7i64).set("name", "Amy");
        assert_ne!(row_id(&x, 0), row_id(&y, 0));
    }

    #[test]
    fn test_resolves_position() {
        let identities = RowIdentities::assign(&rows());
        let id = identities.id_at(2).unwrap().to_string();
        assert_eq!(identities.position(&id), Some(2));
        assert_eq!(identities.position("0-deadbeef"), None);
    }

    #[test]
    fn test_reordered_snapshot_invalidates_ids() {
        let original = rows();
        let before = RowIdentities::assign(&original);
        let mut reversed = original.clone();
        reversed.reverse();
        let after = RowIdentities::assign(&reversed);

        // Amy moved from position 2 to 0.
        let amy_before = before.id_at(2).unwrap();
        assert_eq!(after.position(amy_before), None);
    }

    #[test]
    fn test_id_for() {
        let snapshot = rows();
        let identities = RowIdentities::assign(&snapshot);

        assert_eq!(identities.id_for(&snapshot, &snapshot[2]), identities.id_at(2).unwrap());
        // A clone resolves by content to the first equal row.
        assert_eq!(identities.id_for(&snapshot, &snapshot[1].clone()), identities.id_at(0).unwrap());

        let stranger = Row::new().set("name", "Zed");
        let random = identities.id_for(&snapshot, &stranger);
        assert_eq!(identities.position(&random), None);
    }

    #[test]
    fn test_long_rows_truncate_content() {
        let long = "x".repeat(500);
        let a = Row::new().set("text", long.clone()).set("tail", 1i64);
        let b = Row::new().set("text", long).set("tail", 2i64);
        // Only the first 100 serialized characters count.
        assert_eq!(row_id(&a, 0), row_id(&b, 0));
    }
}

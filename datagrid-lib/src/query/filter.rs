//! Filter types.

use serde::Deserialize;
use serde::Serialize;

use crate::model::DataType;
use crate::model::Row;
use crate::model::Value;

use super::compare::matches;

/// A filter operator.
///
/// String columns understand `Eq`, `Contains`, `StartsWith` and `EndsWith`;
/// number and date columns understand `Eq`, `Gt`, `Gte`, `Lt` and `Lte`.
/// An operator a column type does not understand falls back to that type's
/// default (`Contains` for strings, `Eq` for numbers and dates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Equality.
    Eq,
    /// Substring.
    Contains,
    /// Prefix.
    StartsWith,
    /// Suffix.
    EndsWith,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Unrecognized wire operator.
    #[serde(other)]
    Other,
}

impl Operator {
    /// Returns the wire name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Other => "other",
        }
    }
}

impl std::str::FromStr for Operator {
    type Err = std::convert::Infallible;

    /// Parses a wire name, case-insensitively; unknown names become
    /// [`Operator::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "eq" => Operator::Eq,
            "contains" => Operator::Contains,
            "startswith" => Operator::StartsWith,
            "endswith" => Operator::EndsWith,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            _ => Operator::Other,
        })
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter as supplied by a caller, before a label is derived.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::DataType;
/// use datagrid_lib::query::{FilterSpec, Operator};
///
/// let spec = FilterSpec::new("age", Operator::Gte, 30i64, DataType::Number);
/// assert_eq!(spec.into_active().label, "age gte \"30\"");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Column key the filter applies to.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Value compared against.
    pub value: Value,
    /// Comparator selection.
    #[serde(default)]
    pub data_type: DataType,
}

impl FilterSpec {
    /// Creates a new filter spec.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        data_type: DataType,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
            data_type,
        }
    }

    /// Derives the label and produces an active filter.
    pub fn into_active(self) -> ActiveFilter {
        let label = format!(
            "{} {} \"{}\"",
            self.column,
            self.operator,
            self.value.display_string().unwrap_or_default()
        );
        ActiveFilter {
            column: self.column,
            operator: self.operator,
            value: self.value,
            data_type: self.data_type,
            label,
        }
    }
}

/// A filter currently applied to the grid.
///
/// Only [`FilterSpec::into_active`] builds one, so the label always matches
/// the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    /// Column key the filter applies to.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Value compared against.
    pub value: Value,
    /// Comparator selection.
    pub data_type: DataType,
    /// Display text, `<column> <operator> "<value>"`.
    pub label: String,
}

impl ActiveFilter {
    /// Returns `true` if the row satisfies this filter.
    pub fn matches_row(&self, row: &Row) -> bool {
        matches(row.value(&self.column), &self.value, self.operator, self.data_type)
    }
}

/// Adds a filter, replacing any existing filter on the same column in place.
pub fn upsert_filter(filters: &mut Vec<ActiveFilter>, filter: ActiveFilter) {
    match filters.iter_mut().find(|f| f.column == filter.column) {
        Some(existing) => *existing = filter,
        None => filters.push(filter),
    }
}

/// Keeps the rows satisfying every filter.
pub fn apply_filters(rows: Vec<Row>, filters: &[ActiveFilter]) -> Vec<Row> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| filters.iter().all(|f| f.matches_row(row)))
        .collect()
}

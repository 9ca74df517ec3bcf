//! Column descriptors and automatic column derivation.

use chrono::Datelike;
use serde::Deserialize;
use serde::Serialize;

use super::Row;
use super::Value;
use super::date::parse_date;

/// The declared type of a column, which selects the filter comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Case-insensitive text.
    #[default]
    String,
    /// Floating point.
    Number,
    /// Truthiness equality.
    Boolean,
    /// Calendar date.
    Date,
    /// Date with a time component.
    DateTime,
    /// Anything not recognized on the wire.
    #[serde(other)]
    Unknown,
}

impl DataType {
    /// Returns the wire name of this data type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
            DataType::Unknown => "unknown",
        }
    }

    /// Infers the data type of a runtime value.
    ///
    /// Strings that parse as a date with a year after 1900 are dates, or
    /// date-times when they carry a time component.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => DataType::Boolean,
            Value::Int(_) | Value::Float(_) => DataType::Number,
            Value::DateTime(_) => DataType::DateTime,
            Value::String(s) => match parse_date(s) {
                Some(parsed) if parsed.instant.year() > 1900 => {
                    if parsed.has_time {
                        DataType::DateTime
                    } else {
                        DataType::Date
                    }
                }
                _ => DataType::String,
            },
            Value::Null | Value::Json(_) => DataType::String,
        }
    }
}

impl std::str::FromStr for DataType {
    type Err = std::convert::Infallible;

    /// Parses a wire name; unrecognized names become [`DataType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "string" => DataType::String,
            "number" => DataType::Number,
            "boolean" => DataType::Boolean,
            "date" => DataType::Date,
            "datetime" => DataType::DateTime,
            _ => DataType::Unknown,
        })
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Declares how a field participates in display, sorting and filtering.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{ColumnDescriptor, DataType};
///
/// let column = ColumnDescriptor::new("age", "Age")
///     .data_type(DataType::Number)
///     .sortable(false);
/// assert!(!column.sortable);
/// assert!(column.filterable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Field name in the row.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether the column header sorts.
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether filters may target the column.
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Comparator selection.
    #[serde(default)]
    pub data_type: DataType,
    /// Name of a view-layer cell renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a sortable, filterable string column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            filterable: true,
            data_type: DataType::String,
            renderer: None,
        }
    }

    /// Sets the data type.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets whether the column sorts.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column filters.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets the renderer name.
    pub fn renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }
}

/// Derives one column per field of the first row.
///
/// Returns no columns for an empty dataset.
pub fn derive_columns(rows: &[Row]) -> Vec<ColumnDescriptor> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    first
        .fields()
        .map(|(key, value)| ColumnDescriptor::new(key, humanize(key)).data_type(DataType::infer(value)))
        .collect()
}

/// Turns `firstName` or `first_name` into `First Name`.
pub fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

//! Order-preserving serialization for Row.
//!
//! Rows serialize as plain JSON objects. Deserialization walks the map in
//! document order so the first row's key order can drive column derivation.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Row;
use super::Value;

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object representing a row")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Row, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut row = Row::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            row.insert(key, value);
        }
        Ok(row)
    }
}

impl TryFrom<serde_json::Value> for Row {
    type Error = serde_json::Value;

    /// Converts a JSON object into a row, handing back anything else.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Object(obj) => Ok(obj
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preserves_order() {
        let row: Row = serde_json::from_str(r#"{"zeta": 1, "alpha": "a", "mid": null}"#).unwrap();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(row.get("mid"), Some(&Value::Null));
    }

    #[test]
    fn test_serialize_simple_fields() {
        let row = Row::new().set("name", "Bob").set("id", 1i64);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"name":"Bob","id":1}"#);
    }

    #[test]
    fn test_try_from_non_object() {
        assert!(Row::try_from(serde_json::json!([1, 2])).is_err());
        assert!(Row::try_from(serde_json::json!({"a": 1})).is_ok());
    }
}

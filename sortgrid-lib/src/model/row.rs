//! Dynamic row record

use std::collections::HashMap;

use serde::Deserialize;
use serde::Deserializer;

use super::Value;

/// A single record displayed by the grid.
///
/// Rows hold cell values as a `HashMap<String, Value>` keyed by column id.
/// Identity inside the grid is positional; the optional `key` is only
/// carried for collaborators that need to address a row by id.
///
/// # Example
///
/// ```
/// use sortgrid_lib::model::Row;
///
/// let row = Row::new()
///     .with_key("sofa-1")
///     .set("title", "Sofa")
///     .set("price", 1299.5);
///
/// assert_eq!(row.key(), Some("sofa-1"));
/// assert_eq!(row.get("price").and_then(|v| v.as_f64()), Some(1299.5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    key: Option<String>,
    fields: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets a field and returns the row.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the row key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, or `Value::Null` when absent.
    pub fn value(&self, field: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.fields.get(field).unwrap_or(NULL)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            key: None,
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Row {
    /// Rows arrive as flat JSON objects. An `id` field doubles as the key.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = HashMap::<String, Value>::deserialize(deserializer)?;
        let key = match fields.get("id") {
            Some(Value::Null) | None => None,
            Some(id) => Some(id.to_string()),
        };
        Ok(Row { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_takes_id_as_key() {
        let row: Row = serde_json::from_str(r#"{"id": "sofa-1", "price": 10}"#).unwrap();
        assert_eq!(row.key(), Some("sofa-1"));
        assert_eq!(row.get("price"), Some(&Value::Int(10)));

        let row: Row = serde_json::from_str(r#"{"id": 17}"#).unwrap();
        assert_eq!(row.key(), Some("17"));

        let row: Row = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(row.key(), None);
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let row = Row::new().set("title", "Sofa");
        assert!(row.value("price").is_null());
        assert!(!row.contains("price"));
    }
}

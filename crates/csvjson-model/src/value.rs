//! Raw and typed row representations.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::schema::LogicalType;

/// A coerced field value.
///
/// `Null` means the field was absent or could not be coerced; it is distinct
/// from `String("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Integer(value) => Some(*value as f64),
            TypedValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Logical type carried by the value, `None` for `Null`.
    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            TypedValue::Integer(_) => Some(LogicalType::Integer64),
            TypedValue::Float(_) => Some(LogicalType::Float64),
            TypedValue::String(_) => Some(LogicalType::String),
            TypedValue::Null => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(value) => write!(f, "{value}"),
            TypedValue::Float(value) => write!(f, "{value}"),
            TypedValue::String(value) => f.write_str(value),
            TypedValue::Null => f.write_str("null"),
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Integer(value) => serializer.serialize_i64(*value),
            // Non-finite floats have no JSON form.
            TypedValue::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            TypedValue::Float(_) | TypedValue::Null => serializer.serialize_none(),
            TypedValue::String(value) => serializer.serialize_str(value),
        }
    }
}

/// One source record: column name to raw text.
///
/// A column whose key is missing is absent. Empty text is kept as-is; the
/// engine decides per logical type whether it counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A coerced record whose fields follow the schema's position order.
///
/// Serializes as a JSON object with keys in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedRow {
    fields: Vec<(String, TypedValue)>,
}

impl TypedRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a field. Callers push in position order.
    pub fn push(&mut self, column: impl Into<String>, value: TypedValue) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut TypedValue> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut TypedValue)> {
        self.fields
            .iter_mut()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for TypedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_row_keeps_insertion_order() {
        let mut row = TypedRow::with_capacity(3);
        row.push("zeta", TypedValue::Integer(1));
        row.push("alpha", TypedValue::Null);
        row.push("mid", TypedValue::String("x".to_string()));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":null,"mid":"x"}"#);
    }

    #[test]
    fn non_finite_float_serializes_as_null() {
        let json = serde_json::to_string(&TypedValue::Float(f64::NAN)).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&TypedValue::Float(f64::NEG_INFINITY)).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn raw_row_from_pairs() {
        let row: RawRow = [("id", "7"), ("name", "")].into_iter().collect();
        assert_eq!(row.get("id"), Some("7"));
        assert_eq!(row.get("name"), Some(""));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }
}

//! Row records and identity.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single list row: an ordered map of field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Set a field, returning the row for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The row's identity under `id_key`, if present and usable.
    pub fn id(&self, id_key: &str) -> Option<RowId> {
        self.0.get(id_key).and_then(RowId::from_value)
    }

    /// Iterate over fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Canonical row identity.
///
/// Strings are used as-is; numbers and booleans use their JSON rendering, so
/// `1` and `"1"` address the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    /// Create a row id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a row id from a JSON value. Null, arrays and objects have no id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! row_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RowId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

row_id_from_int!(i32, i64, u32, u64, usize);

/// Find a row by id in a slice of rows.
pub fn find_row<'a>(rows: &'a [Row], id_key: &str, id: &RowId) -> Option<&'a Row> {
    rows.iter().find(|row| row.id(id_key).as_ref() == Some(id))
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Ascending comparison of two optional field values.
///
/// Missing and null values sort after everything else. Values of different
/// kinds compare by kind.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_id_from_number_and_string_match() {
        let a = Row::from_value(json!({"id": 1})).unwrap();
        let b = Row::from_value(json!({"id": "1"})).unwrap();
        assert_eq!(a.id("id"), b.id("id"));
    }

    #[test]
    fn test_row_without_id() {
        let row = Row::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(row.id("id"), None);
        let row = Row::from_value(json!({"id": null})).unwrap();
        assert_eq!(row.id("id"), None);
    }

    #[test]
    fn test_compare_numbers_numerically() {
        assert_eq!(
            compare_values(Some(&json!(9)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!(2.5)), Some(&json!(2))),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_missing_sorts_last() {
        assert_eq!(compare_values(None, Some(&json!("a"))), Ordering::Greater);
        assert_eq!(
            compare_values(Some(&json!(null)), Some(&json!(0))),
            Ordering::Greater
        );
        assert_eq!(compare_values(None, Some(&json!(null))), Ordering::Equal);
    }

    #[test]
    fn test_compare_strings() {
        assert_eq!(
            compare_values(Some(&json!("a")), Some(&json!("b"))),
            Ordering::Less
        );
    }
}

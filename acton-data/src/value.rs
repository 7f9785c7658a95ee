//! Values bound into statements and decoded from result rows
//!
//! [`Value`] is the driver-neutral form of a single SQL value. Records turn
//! their fields into values for writes, conditions carry them as operands, and
//! storage backends decode result columns into a [`Row`] of values that
//! records read back with [`FromValue`].
//!
//! # Example
//!
//! ```rust
//! use acton_data::value::{Row, Value};
//!
//! let row = Row::from_pairs([("id", Value::from(7_i64)), ("name", Value::from("alice"))]);
//! let id: i64 = row.get("id").unwrap();
//! let name: String = row.get("name").unwrap();
//! assert_eq!((id, name.as_str()), (7, "alice"));
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::MappingError;

/// A single SQL value
///
/// Serializes untagged, as the bare inner value. UUIDs and timestamps become
/// strings, so there is no `Deserialize`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Text value
    Text(String),
    /// UUID value
    Uuid(Uuid),
    /// Timestamp with time zone, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Calendar date
    Date(NaiveDate),
    /// JSON document
    Json(serde_json::Value),
    /// Sequence of values; expands to set membership in `eq`/`in` conditions
    List(Vec<Value>),
}

impl Value {
    /// Whether this is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a sequence
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Short name of the variant, used in mapping errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Timestamp(_) => "timestamp",
            Self::Date(_) => "date",
            Self::Json(_) => "json",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(list: Vec<T>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a decoded [`Value`] into a Rust type
pub trait FromValue: Sized {
    /// Type name reported in mapping errors
    const TYPE_NAME: &'static str;

    /// Convert, or return `None` when the value has an incompatible shape
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "text";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            Value::Uuid(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "int4";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => i32::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl FromValue for i16 {
    const TYPE_NAME: &'static str = "int2";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => i16::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl FromValue for u64 {
    const TYPE_NAME: &'static str = "unsigned int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl FromValue for Uuid {
    const TYPE_NAME: &'static str = "uuid";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uuid(id) => Some(*id),
            Value::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl FromValue for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl FromValue for serde_json::Value {
    const TYPE_NAME: &'static str = "json";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Json(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// One result row: ordered `(column, value)` pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a column
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((column.into(), value.into()));
    }

    /// Raw value of a column
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Typed value of a column
    ///
    /// Fails with [`MappingError::MissingColumn`] when the column is absent and
    /// [`MappingError::TypeMismatch`] when the value has another shape.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, MappingError> {
        let value = self
            .value(column)
            .ok_or_else(|| MappingError::MissingColumn(column.to_string()))?;
        T::from_value(value).ok_or_else(|| MappingError::TypeMismatch {
            column: column.to_string(),
            expected: T::TYPE_NAME,
            actual: value.type_name(),
        })
    }

    /// Typed value of a column, `None` when the column is absent
    pub fn try_get_opt<T: FromValue>(&self, column: &str) -> Result<Option<T>, MappingError> {
        match self.value(column) {
            None => Ok(None),
            Some(_) => self.get(column).map(Some),
        }
    }

    /// Column names in result order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn test_vec_into_list() {
        let v: Value = vec!["a", "b"].into();
        assert_eq!(
            v,
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
        );
        assert!(v.is_list());
    }

    #[test]
    fn test_row_get_typed() {
        let id = Uuid::new_v4();
        let row = Row::from_pairs([
            ("id", Value::Uuid(id)),
            ("age", Value::Int(41)),
            ("deleted_at", Value::Null),
        ]);
        assert_eq!(row.get::<Uuid>("id").unwrap(), id);
        assert_eq!(row.get::<i32>("age").unwrap(), 41);
        assert_eq!(row.get::<Option<DateTime<Utc>>>("deleted_at").unwrap(), None);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_row_missing_column() {
        let row = Row::new();
        assert_eq!(
            row.get::<i64>("count"),
            Err(MappingError::MissingColumn("count".into()))
        );
        assert_eq!(row.try_get_opt::<i64>("count"), Ok(None));
    }

    #[test]
    fn test_row_type_mismatch() {
        let row = Row::from_pairs([("name", "bob")]);
        match row.get::<i64>("name") {
            Err(MappingError::TypeMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, "int");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_uuid_from_text() {
        let id = Uuid::new_v4();
        let row = Row::from_pairs([("id", id.to_string())]);
        assert_eq!(row.get::<Uuid>("id").unwrap(), id);
    }

    #[test]
    fn test_narrowing_overflow_is_mismatch() {
        let row = Row::from_pairs([("n", Value::Int(i64::from(i32::MAX) + 1))]);
        assert!(row.get::<i32>("n").is_err());
        assert!(row.get::<i64>("n").is_ok());
    }

    #[test]
    fn test_serializes_bare_values() {
        let id = Uuid::new_v4();
        let list = Value::List(vec![Value::Int(1), Value::Null, Value::Uuid(id)]);
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            serde_json::json!([1, null, id.to_string()])
        );
    }
}

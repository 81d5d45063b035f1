//! Column handles, values and row cursors consumed by the analyzers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The broad data type category of a column, governing which measures apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueFamily {
    /// Integer, floating point and decimal values.
    Number,
    /// Free text.
    Text,
    /// True/false values.
    Boolean,
    /// Dates, times and timestamps.
    DateTime,
}

impl fmt::Display for ValueFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueFamily::Number => "number",
            ValueFamily::Text => "text",
            ValueFamily::Boolean => "boolean",
            ValueFamily::DateTime => "date/time",
        };
        f.write_str(name)
    }
}

/// Identifies one logical data column of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputColumn {
    name: String,
    family: ValueFamily,
}

impl InputColumn {
    /// Creates a column handle.
    pub fn new(name: impl Into<String>, family: ValueFamily) -> Self {
        Self {
            name: name.into(),
            family,
        }
    }

    /// Creates a numeric column handle.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ValueFamily::Number)
    }

    /// Creates a text column handle.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueFamily::Text)
    }

    /// Creates a boolean column handle.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueFamily::Boolean)
    }

    /// Creates a date/time column handle.
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::new(name, ValueFamily::DateTime)
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value family.
    pub fn family(&self) -> ValueFamily {
        self.family
    }
}

impl fmt::Display for InputColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.family)
    }
}

/// A single cell value as delivered by a row source.
///
/// Numbers compare and hash by bit pattern so that rows can be grouped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Absent value.
    Null,
    /// A numeric value.
    Number(#[serde(with = "crate::types::float_repr")] f64),
    /// A text value.
    Text(String),
    /// A boolean value.
    Boolean(bool),
    /// A date/time value.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the number, treating NaN as absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a date/time value.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Number(v) => v.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

static NULL: Value = Value::Null;

/// Read-only accessor to one row's values.
///
/// Row ids must be unique within one logical scan; the annotation store uses
/// them to identify sampled evidence rows across partitions.
pub trait InputRow: Send + Sync + fmt::Debug {
    /// Returns the row id.
    fn id(&self) -> u64;

    /// Returns the value for the column, `None` when the row has no such column.
    fn get(&self, column: &InputColumn) -> Option<&Value>;

    /// Returns a snapshot of all values, used for evidence samples.
    fn snapshot(&self) -> SampleRow;

    /// Returns the value for the column, treating a missing column as null.
    fn value(&self, column: &InputColumn) -> &Value {
        self.get(column).unwrap_or(&NULL)
    }
}

/// An owned row backed by an ordered list of named values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRow {
    id: u64,
    values: Vec<(String, Value)>,
}

impl MemoryRow {
    /// Creates an empty row with the given id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            values: Vec::new(),
        }
    }

    /// Adds (or replaces) a named value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a named value in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Returns a copy of this row with a different id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

impl InputRow for MemoryRow {
    fn id(&self) -> u64 {
        self.id
    }

    fn get(&self, column: &InputColumn) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column.name())
            .map(|(_, value)| value)
    }

    fn snapshot(&self) -> SampleRow {
        SampleRow {
            id: self.id,
            values: self.values.clone(),
        }
    }
}

/// A retained copy of a row that contributed to an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRow {
    /// Id of the original row.
    pub id: u64,
    /// Column values at the time the row was annotated.
    pub values: Vec<(String, Value)>,
}

impl SampleRow {
    /// Returns the sampled value of the named column.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
        assert_eq!(Value::from("abc").as_text(), Some("abc"));
        assert_eq!(Value::from(true).as_boolean(), Some(true));
        assert!(Value::from(None::<f64>).is_null());
        assert_eq!(Value::Text("1".into()).as_number(), None);
    }

    #[test]
    fn test_value_hash_groups_identical_numbers() {
        let mut set = HashSet::new();
        set.insert(Value::Number(1.0));
        set.insert(Value::Number(1.0));
        set.insert(Value::Number(-0.0));
        set.insert(Value::Null);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_memory_row_lookup() {
        let age = InputColumn::number("age");
        let name = InputColumn::text("name");
        let row = MemoryRow::new(7).with("age", 42.0).with("age", 43.0);

        assert_eq!(row.id(), 7);
        assert_eq!(row.value(&age).as_number(), Some(43.0));
        assert!(row.get(&name).is_none());
        assert!(row.value(&name).is_null());

        let sample = row.snapshot();
        assert_eq!(sample.id, 7);
        assert_eq!(sample.value("age"), Some(&Value::Number(43.0)));
    }

    #[test]
    fn test_sample_row_keeps_non_finite_numbers_through_json() {
        let sample = MemoryRow::new(3)
            .with("ratio", f64::NAN)
            .with("limit", f64::INFINITY)
            .with("floor", f64::NEG_INFINITY)
            .with("age", 42.0)
            .snapshot();
        let json = serde_json::to_string(&sample).unwrap();
        let back: SampleRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
        assert!(matches!(back.value("ratio"), Some(Value::Number(v)) if v.is_nan()));
    }
}

//! Row fixtures shared by unit tests. Row ids are the value positions.

use crate::data::{MemoryRow, Value};

pub(crate) fn number_rows(column: &str, values: &[Option<f64>]) -> Vec<MemoryRow> {
    rows(column, values.iter().map(|v| Value::from(*v)))
}

pub(crate) fn text_rows(column: &str, values: &[Option<&str>]) -> Vec<MemoryRow> {
    rows(
        column,
        values.iter().map(|v| Value::from(v.map(str::to_string))),
    )
}

fn rows(column: &str, values: impl Iterator<Item = Value>) -> Vec<MemoryRow> {
    values
        .enumerate()
        .map(|(id, value)| MemoryRow::new(id as u64).with(column, value))
        .collect()
}

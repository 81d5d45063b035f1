//! Conversion of Arrow record batches into analyzer rows.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use std::collections::HashMap;

use crate::data::{InputColumn, MemoryRow, Value, ValueFamily};
use crate::error::{ProfileError, Result};

/// The value family an Arrow type is profiled as, if any.
pub fn value_family(data_type: &DataType) -> Option<ValueFamily> {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => Some(ValueFamily::Number),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(ValueFamily::Text),
        DataType::Boolean => Some(ValueFamily::Boolean),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            Some(ValueFamily::DateTime)
        }
        _ => None,
    }
}

impl InputColumn {
    /// Maps every field of an Arrow schema to a column.
    ///
    /// Fields of a type no family covers are a configuration error.
    pub fn from_schema(schema: &Schema) -> Result<Vec<InputColumn>> {
        schema
            .fields()
            .iter()
            .map(|field| match value_family(field.data_type()) {
                Some(family) => Ok(InputColumn::new(field.name().as_str(), family)),
                None => Err(ProfileError::UnsupportedType {
                    column: field.name().to_string(),
                    data_type: field.data_type().to_string(),
                }),
            })
            .collect()
    }
}

/// Converts a batch into rows numbered from `first_row_id`.
pub fn rows_from_batch(batch: &RecordBatch, first_row_id: u64) -> Result<Vec<MemoryRow>> {
    let columns = InputColumn::from_schema(batch.schema().as_ref())?;
    let mut rows: Vec<MemoryRow> = (0..batch.num_rows())
        .map(|i| MemoryRow::new(first_row_id + i as u64))
        .collect();

    for (column, array) in columns.iter().zip(batch.columns()) {
        let values = column_values(column.family(), array)?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.set(column.name(), value);
        }
    }
    Ok(rows)
}

fn column_values(family: ValueFamily, array: &ArrayRef) -> Result<Vec<Value>> {
    let values: Vec<Value> = match family {
        ValueFamily::Number => {
            let array = cast(array, &DataType::Float64)?;
            let array = downcast::<Float64Array>(&array)?;
            array.iter().map(Value::from).collect()
        }
        ValueFamily::Text => {
            let array = cast(array, &DataType::Utf8)?;
            let array = downcast::<StringArray>(&array)?;
            array.iter().map(Value::from).collect()
        }
        ValueFamily::Boolean => {
            let array = downcast::<BooleanArray>(array)?;
            array.iter().map(Value::from).collect()
        }
        ValueFamily::DateTime => {
            let array = cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
            let array = downcast::<TimestampMillisecondArray>(&array)?;
            array
                .iter()
                .map(|millis| {
                    millis
                        .and_then(DateTime::from_timestamp_millis)
                        .map(|instant| instant.naive_utc())
                        .into()
                })
                .collect()
        }
    };
    Ok(values)
}

fn downcast<T: Array + 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ProfileError::invalid_data(format!(
            "Unexpected array type {} after conversion",
            array.data_type()
        ))
    })
}

/// A row standing for `weight` identical rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRow {
    pub row: MemoryRow,
    pub weight: u64,
}

/// Collapses rows with identical values, keeping the first occurrence's id.
///
/// Output order is the order of first occurrence.
pub fn group_identical_rows(rows: impl IntoIterator<Item = MemoryRow>) -> Vec<WeightedRow> {
    let mut grouped: Vec<WeightedRow> = Vec::new();
    let mut index: HashMap<Vec<(String, Value)>, usize> = HashMap::new();
    for row in rows {
        match index.get(row.values()) {
            Some(&position) => grouped[position].weight += 1,
            None => {
                index.insert(row.values().to_vec(), grouped.len());
                grouped.push(WeightedRow { row, weight: 1 });
            }
        }
    }
    grouped
}

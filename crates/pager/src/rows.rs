// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Row-wise conversion of Arrow batches into JSON-like rows.

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type, UInt16Type,
    UInt32Type, UInt64Type,
};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_schema::{ArrowError, DataType};
use serde_json::{Map, Number, Value};

/// One result row, keyed by column name in column order
pub type Row = Map<String, Value>;

/// Largest integer a double-precision consumer can represent exactly
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Convert every row of `batch`. Callers slice first so only the rows they
/// need are converted.
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Row>, ArrowError> {
    let options = FormatOptions::default();
    let schema = batch.schema();
    let readers = batch
        .columns()
        .iter()
        .map(|array| ColumnReader::try_new(array, &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut out = Map::with_capacity(readers.len());
        for (field, reader) in schema.fields().iter().zip(&readers) {
            let _ = out.insert(field.name().clone(), reader.value(row));
        }
        rows.push(out);
    }
    Ok(rows)
}

struct ColumnReader<'a> {
    array: &'a ArrayRef,
    formatter: ArrayFormatter<'a>,
}

impl<'a> ColumnReader<'a> {
    fn try_new(array: &'a ArrayRef, options: &'a FormatOptions<'a>) -> Result<Self, ArrowError> {
        Ok(Self {
            array,
            formatter: ArrayFormatter::try_new(array.as_ref(), options)?,
        })
    }

    fn value(&self, row: usize) -> Value {
        let array = self.array;
        if array.is_null(row) {
            return Value::Null;
        }
        match array.data_type() {
            DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
            DataType::Int8 => Value::from(array.as_primitive::<Int8Type>().value(row)),
            DataType::Int16 => Value::from(array.as_primitive::<Int16Type>().value(row)),
            DataType::Int32 => Value::from(array.as_primitive::<Int32Type>().value(row)),
            DataType::Int64 => signed(array.as_primitive::<Int64Type>().value(row)),
            DataType::UInt8 => Value::from(array.as_primitive::<UInt8Type>().value(row)),
            DataType::UInt16 => Value::from(array.as_primitive::<UInt16Type>().value(row)),
            DataType::UInt32 => Value::from(array.as_primitive::<UInt32Type>().value(row)),
            DataType::UInt64 => unsigned(array.as_primitive::<UInt64Type>().value(row)),
            DataType::Float32 => {
                float(f64::from(array.as_primitive::<Float32Type>().value(row)))
            }
            DataType::Float64 => float(array.as_primitive::<Float64Type>().value(row)),
            DataType::Utf8 => Value::String(array.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Value::String(array.as_string::<i64>().value(row).to_string()),
            DataType::Utf8View => Value::String(array.as_string_view().value(row).to_string()),
            // Decimals, temporal types, binary and nested values keep their
            // exact Arrow rendering rather than a lossy numeric form
            _ => Value::String(self.formatter.value(row).to_string()),
        }
    }
}

fn signed(v: i64) -> Value {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&v) {
        Value::from(v)
    } else {
        Value::String(v.to_string())
    }
}

fn unsigned(v: u64) -> Value {
    match i64::try_from(v) {
        Ok(v) => signed(v),
        Err(_) => Value::String(v.to_string()),
    }
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or_else(|| Value::String(v.to_string()), Value::Number)
}

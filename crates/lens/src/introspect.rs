// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table discovery for attached relational databases.
//!
//! DuckDB's `SHOW TABLES` returns a single `name` column. Other engines
//! and older bindings have used `table_name`, so the lookup tries a short
//! list of keys per row and settles for the first column otherwise.

use crate::engine::{Engine, close_quietly};
use crate::error::IntrospectError;
use crate::sql;
use arrow_array::cast::AsArray;
use arrow_array::{Array, RecordBatch};
use arrow_schema::DataType;
use log::debug;

const NAME_COLUMNS: [&str; 4] = ["name", "table_name", "Name", "Table"];

/// List the tables of the attached schema `schema`, in listing order
pub async fn list_tables(
    engine: &dyn Engine,
    schema: &str,
) -> Result<Vec<String>, IntrospectError> {
    let mut conn = engine.connect().await?;
    let listing = async {
        conn.execute(&sql::use_schema(schema)).await?;
        conn.query(sql::SHOW_TABLES).await
    }
    .await;
    close_quietly(conn).await;
    let listing = listing?;

    if listing.num_rows() == 0 {
        return Err(IntrospectError::EmptyAttachment {
            schema: schema.to_string(),
        });
    }

    let tables = table_names(&listing);
    if tables.is_empty() {
        return Err(IntrospectError::UnrecognizedSchema {
            schema: schema.to_string(),
        });
    }
    debug!("Schema {schema} has tables {tables:?}");
    Ok(tables)
}

/// Extract one table name per row, skipping rows without a usable string
pub fn table_names(listing: &RecordBatch) -> Vec<String> {
    let schema = listing.schema();
    let keyed: Vec<&dyn Array> = NAME_COLUMNS
        .iter()
        .filter_map(|key| schema.index_of(key).ok())
        .map(|idx| listing.column(idx).as_ref())
        .collect();
    let first = (listing.num_columns() > 0).then(|| listing.column(0).as_ref());

    let mut names: Vec<String> = Vec::new();
    for row in 0..listing.num_rows() {
        let found = keyed
            .iter()
            .find_map(|col| string_at(*col, row))
            .or_else(|| first.and_then(|col| string_at(col, row)));
        if let Some(name) = found {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn string_at(array: &dyn Array, row: usize) -> Option<String> {
    if array.is_null(row) {
        return None;
    }
    let value = match array.data_type() {
        DataType::Utf8 => array.as_string::<i32>().value(row),
        DataType::LargeUtf8 => array.as_string::<i64>().value(row),
        DataType::Utf8View => array.as_string_view().value(row),
        _ => return None,
    };
    (!value.is_empty()).then(|| value.to_string())
}

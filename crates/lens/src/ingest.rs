// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::engine::{Engine, close_quietly};
use crate::error::{EngineError, LensError, Result};
use crate::format::{FileFormat, detect_file};
use crate::introspect::list_tables;
use crate::naming::schema_name_for;
use crate::source::DataSource;
use crate::sql;
use log::{debug, error, info};

/// Turn `data` into a queryable table or attached schema named after
/// `declared_name`. Nothing is written to the file store here.
pub async fn ingest(
    engine: &dyn Engine,
    data: &[u8],
    file_name: &str,
    declared_name: &str,
) -> Result<DataSource> {
    let format = detect_file(file_name, data);
    let location = engine.register_bytes(file_name, data).await?;
    info!("Ingesting {file_name} as {format} into {declared_name}");

    match sql::reader_call(format, &location) {
        Some(reader) => {
            create_table(engine, &reader, file_name, format, declared_name).await?;
            Ok(DataSource::Regular {
                name: declared_name.to_string(),
            })
        }
        None => attach(engine, &location, file_name, declared_name).await,
    }
}

async fn create_table(
    engine: &dyn Engine,
    reader: &str,
    file_name: &str,
    format: FileFormat,
    table: &str,
) -> Result<()> {
    let statement = sql::create_table_as(table, reader);
    run_statement(engine, &statement)
        .await
        .map_err(|e| creation_error(e, file_name, format, table))
}

async fn attach(
    engine: &dyn Engine,
    location: &str,
    file_name: &str,
    declared_name: &str,
) -> Result<DataSource> {
    let schema = schema_name_for(declared_name);
    run_statement(engine, &sql::attach_sqlite(location, &schema))
        .await
        .map_err(|e| creation_error(e, file_name, FileFormat::Sqlite, &schema))?;

    match list_tables(engine, &schema).await {
        Ok(tables) => Ok(DataSource::RelationalAttachment {
            name: declared_name.to_string(),
            schema_name: schema,
            child_tables: tables,
        }),
        Err(source) => {
            debug!("Introspection of {schema} failed, detaching: {source}");
            if let Err(e) = run_statement(engine, &sql::detach_if_exists(&schema)).await {
                error!("Failed to detach {schema} after failed introspection: {e}");
            }
            Err(LensError::EmptyOrInvalidAttachment { schema, source })
        }
    }
}

/// Execute one statement on a connection of its own
pub(crate) async fn run_statement(
    engine: &dyn Engine,
    statement: &str,
) -> std::result::Result<(), EngineError> {
    let mut conn = engine.connect().await?;
    let result = conn.execute(statement).await;
    close_quietly(conn).await;
    result
}

fn creation_error(err: EngineError, file_name: &str, format: FileFormat, name: &str) -> LensError {
    match err {
        EngineError::AlreadyExists { .. } => LensError::NameCollision {
            name: name.to_string(),
        },
        EngineError::InvalidInput { message } => LensError::ParseFailure {
            file_name: file_name.to_string(),
            format,
            message,
        },
        other => LensError::Engine(other),
    }
}

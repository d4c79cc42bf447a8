// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use lens::{DataSource, UploadField, UploadedFile, new_data_source_id};
use log::debug;
use std::io::Write;
use std::path::Path;

use crate::common::Session;

/// Upload `file` as a new data source and record it in the session state
pub(crate) async fn register_upload(
    session: &mut Session,
    file: &UploadedFile,
    name: &str,
    id: Option<&str>,
    out: &mut dyn Write,
) -> Result<String> {
    let id = id.map_or_else(new_data_source_id, str::to_string);
    debug!("Uploading {} as {name} with id {id}", file.file_name);

    let source = match session.lens.upload_data_source(file, name, &id).await {
        Ok(source) => source,
        Err(e) => {
            let field = match e.upload_field() {
                UploadField::File => "file",
                UploadField::Name => "name",
            };
            return Err(e).with_context(|| format!("cannot add {} ({field})", file.file_name));
        }
    };

    describe(&source, &id, out)?;
    session.state.add(&id, source);
    session.save_state().await?;
    Ok(id)
}

fn describe(source: &DataSource, id: &str, out: &mut dyn Write) -> Result<()> {
    match source {
        DataSource::Regular { name } => writeln!(out, "Added table {name} ({id})")?,
        DataSource::RelationalAttachment {
            name,
            schema_name,
            child_tables,
        } => {
            writeln!(out, "Attached {name} as schema {schema_name} ({id})")?;
            for table in child_tables {
                writeln!(out, "  {schema_name}.{table}")?;
            }
        }
    }
    Ok(())
}

pub async fn add_command(
    session: &mut Session,
    path: &Path,
    name: Option<&str>,
    id: Option<&str>,
    out: &mut dyn Write,
) -> Result<String> {
    let file = UploadedFile::from_path(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let name = name.map_or_else(|| file.suggested_name(), str::to_string);
    register_upload(session, &file, &name, id, out).await
}

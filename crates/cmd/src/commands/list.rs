// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use std::collections::BTreeSet;
use std::io::Write;

use crate::common::{Session, format_file_size, format_timestamp};

/// Print every data source: loaded ones with their tables, stored files
/// that failed to load with the reason, and records whose file is gone
pub async fn list_command(session: &Session, out: &mut dyn Write) -> Result<()> {
    let stored = session.lens.store().get_all().await?;
    let mut seen = BTreeSet::new();

    for file in &stored {
        let _ = seen.insert(file.id.as_str());
        let details = format!(
            "{}, {}, {}",
            file.file_name,
            format_file_size(file.data.len()),
            format_timestamp(file.uploaded_at)
        );

        if let Some(source) = session.state.get(&file.id) {
            let kind = if source.is_attachment() { "schema" } else { "table" };
            writeln!(out, "{} {kind} {} ({details})", file.id, source.name())?;
            if source.is_attachment() {
                for target in source.query_targets() {
                    writeln!(out, "    {target}")?;
                }
            }
        } else if let Some(failure) = session.report.failed.iter().find(|f| f.id == file.id) {
            writeln!(
                out,
                "{} {} not loaded: {} ({details})",
                file.id, file.declared_name, failure.error
            )?;
        } else {
            writeln!(out, "{} {} ({details})", file.id, file.declared_name)?;
        }
    }

    for (id, source) in &session.state.data_sources {
        if !seen.contains(id.as_str()) {
            writeln!(out, "{id} {} missing stored file", source.name())?;
        }
    }

    if stored.is_empty() && session.state.data_sources.is_empty() {
        writeln!(out, "No data sources")?;
    }
    Ok(())
}

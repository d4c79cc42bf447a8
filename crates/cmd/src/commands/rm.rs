// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use std::io::Write;

use crate::common::Session;

pub async fn rm_command(session: &mut Session, id: &str, out: &mut dyn Write) -> Result<()> {
    match session.state.get(id).cloned() {
        Some(source) => session.lens.delete_data_source(id, &source).await?,
        None => session.lens.delete_by_id(id).await?,
    }

    if let Some(source) = session.state.remove(id) {
        writeln!(out, "Removed {} ({id})", source.name())?;
    } else {
        writeln!(out, "Removed {id}")?;
    }
    session.save_state().await
}

// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, bail};
use lens::{FileFormat, paste_file, sanitize_table_name};
use std::io::Write;

use super::add::register_upload;
use crate::common::Session;

/// Upload pasted `text` under `name`, detecting the format unless given
pub async fn paste_command(
    session: &mut Session,
    text: &str,
    name: &str,
    format: Option<FileFormat>,
    out: &mut dyn Write,
) -> Result<String> {
    let Some(file) = paste_file(text, &sanitize_table_name(name), format) else {
        bail!("nothing to paste");
    };
    register_upload(session, &file, name, None, out).await
}

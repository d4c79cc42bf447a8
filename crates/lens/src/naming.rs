// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use regex::Regex;
use std::sync::LazyLock;

static NON_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static pattern"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("static pattern"));

/// Turn an arbitrary label (typically a file stem) into a lowercase SQL
/// identifier
#[must_use]
pub fn sanitize_table_name(name: &str) -> String {
    let replaced = NON_IDENT.replace_all(name, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_').to_lowercase();

    let name = if trimmed.is_empty() {
        "table".to_string()
    } else {
        trimmed
    };
    if name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        name
    } else {
        format!("_{name}")
    }
}

/// Schema alias used when attaching a relational database under
/// `declared_name`
#[must_use]
pub fn schema_name_for(declared_name: &str) -> String {
    NON_IDENT.replace_all(declared_name, "_").into_owned()
}

/// Proposed declared name for an uploaded file: its sanitized stem
#[must_use]
pub fn suggested_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    sanitize_table_name(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_table_name() {
        assert_eq!(sanitize_table_name("My-Sales Data (2024)"), "my_sales_data_2024");
        assert_eq!(sanitize_table_name("__a--b__"), "a_b");
        assert_eq!(sanitize_table_name("2024 report"), "_2024_report");
        assert_eq!(sanitize_table_name("!!!"), "table");
        assert_eq!(sanitize_table_name("café"), "caf");
    }

    #[test]
    fn test_schema_name_for_keeps_runs() {
        assert_eq!(schema_name_for("my db--2"), "my_db__2");
        assert_eq!(schema_name_for("chinook"), "chinook");
    }

    #[test]
    fn test_suggested_name() {
        assert_eq!(suggested_name("/tmp/Rayon-RS dataset.jsonl"), "rayon_rs_dataset");
        assert_eq!(suggested_name("archive.tar.gz"), "archive_tar");
        assert_eq!(suggested_name(".env"), "env");
    }
}

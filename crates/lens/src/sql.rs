// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Statement text issued to the engine.

use crate::format::FileFormat;
use pager::MARKDOWN_MAGIC;

pub const SHOW_TABLES: &str = "SHOW TABLES";
pub const INSTALL_SQLITE: &str = "INSTALL sqlite";
pub const LOAD_SQLITE: &str = "LOAD sqlite";

/// Double-quoted identifier
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quoted string literal
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Table function reading `location` in `format`. `None` for formats that
/// are attached rather than read.
#[must_use]
pub fn reader_call(format: FileFormat, location: &str) -> Option<String> {
    let loc = quote_literal(location);
    let call = match format {
        FileFormat::Csv => format!("read_csv({loc}, delim=',')"),
        FileFormat::Tsv => format!("read_csv({loc}, delim=E'\\t')"),
        FileFormat::Json | FileFormat::JsonLines => format!("read_json_auto({loc})"),
        FileFormat::Parquet => format!("read_parquet({loc})"),
        FileFormat::Unknown => format!("read_csv({loc})"),
        FileFormat::Sqlite => return None,
    };
    Some(call)
}

#[must_use]
pub fn create_table_as(table: &str, reader: &str) -> String {
    format!("CREATE TABLE {} AS SELECT * FROM {reader}", quote_ident(table))
}

#[must_use]
pub fn attach_sqlite(location: &str, schema: &str) -> String {
    format!(
        "ATTACH {} AS {} (TYPE sqlite)",
        quote_literal(location),
        quote_ident(schema)
    )
}

#[must_use]
pub fn detach_if_exists(schema: &str) -> String {
    format!("DETACH DATABASE IF EXISTS {}", quote_ident(schema))
}

#[must_use]
pub fn drop_table_if_exists(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

#[must_use]
pub fn use_schema(schema: &str) -> String {
    format!("USE {}", quote_ident(schema))
}

#[must_use]
pub fn count_rows(table: &str) -> String {
    format!("SELECT count(*) AS row_count FROM {}", quote_ident(table))
}

/// `md(text)` tags text so result tables render it as markdown
#[must_use]
pub fn markdown_macro() -> String {
    format!(
        "CREATE OR REPLACE MACRO md(text) AS concat({}, text)",
        quote_literal(MARKDOWN_MAGIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_literal("it's.csv"), "'it''s.csv'");
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            create_table_as("sales", &reader_call(FileFormat::Csv, "/s/0/sales.csv").unwrap_or_default()),
            "CREATE TABLE \"sales\" AS SELECT * FROM read_csv('/s/0/sales.csv', delim=',')"
        );
        assert_eq!(
            reader_call(FileFormat::Tsv, "t.tsv").as_deref(),
            Some("read_csv('t.tsv', delim=E'\\t')")
        );
        assert!(reader_call(FileFormat::Sqlite, "c.db").is_none());
        assert_eq!(
            attach_sqlite("c.db", "chinook"),
            "ATTACH 'c.db' AS \"chinook\" (TYPE sqlite)"
        );
        assert_eq!(detach_if_exists("chinook"), "DETACH DATABASE IF EXISTS \"chinook\"");
        assert_eq!(drop_table_if_exists("t"), "DROP TABLE IF EXISTS \"t\"");
    }
}

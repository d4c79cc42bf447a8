// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Best-effort classification of uploaded and pasted content.
//!
//! Detection is advisory: ingestion still runs the reader for the detected
//! format and reports a parse failure if the content does not match.

use serde::{Deserialize, Serialize};
use serde::de::IgnoredAny;
use std::fmt;
use std::str::FromStr;

const PARQUET_MAGIC: &[u8] = b"PAR1";
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Only this much of a file is inspected by the text heuristic
const SNIFF_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    JsonLines,
    Parquet,
    Sqlite,
    Unknown,
}

impl FileFormat {
    /// Format for a known extension (case-insensitive)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            "jsonl" | "ndjson" => Some(FileFormat::JsonLines),
            "parquet" => Some(FileFormat::Parquet),
            "db" | "sqlite" | "sqlite3" => Some(FileFormat::Sqlite),
            _ => None,
        }
    }

    /// Canonical extension used when a file has to be named
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv | FileFormat::Unknown => "csv",
            FileFormat::Tsv => "tsv",
            FileFormat::Json => "json",
            FileFormat::JsonLines => "jsonl",
            FileFormat::Parquet => "parquet",
            FileFormat::Sqlite => "sqlite",
        }
    }

    /// Relational database files are attached as a schema rather than
    /// loaded into a single table
    #[must_use]
    pub fn is_relational(self) -> bool {
        self == FileFormat::Sqlite
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Tsv => "TSV",
            FileFormat::Json => "JSON",
            FileFormat::JsonLines => "JSON lines",
            FileFormat::Parquet => "Parquet",
            FileFormat::Sqlite => "SQLite",
            FileFormat::Unknown => "delimited text",
        };
        f.write_str(label)
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileFormat::from_extension(s).ok_or_else(|| format!("unknown format {s:?}"))
    }
}

/// Lowercased extension of `file_name`, if it has one
#[must_use]
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

/// Classify pasted text
#[must_use]
pub fn detect_text(text: &str) -> FileFormat {
    detect_text_sample(text, true)
}

/// `complete` is false when `text` is only a prefix of the content, in which
/// case a JSON document cannot be validated by parsing it.
fn detect_text_sample(text: &str, complete: bool) -> FileFormat {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FileFormat::Csv;
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let lines: Vec<&str> = trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() > 1 && lines.iter().all(|line| line.starts_with('{')) {
            return FileFormat::JsonLines;
        }
        if !complete || serde_json::from_str::<IgnoredAny>(trimmed).is_ok() {
            return FileFormat::Json;
        }
        // Looked like JSON but isn't; treat as delimited text
    } else if let Some(header) = trimmed.lines().next() {
        if header.split('\t').count() > 1 {
            return FileFormat::Tsv;
        }
    }

    FileFormat::Csv
}

/// Classify raw bytes by signature, then by the text heuristic
#[must_use]
pub fn sniff_bytes(data: &[u8]) -> FileFormat {
    if data.starts_with(PARQUET_MAGIC) {
        return FileFormat::Parquet;
    }
    if data.starts_with(SQLITE_MAGIC) {
        return FileFormat::Sqlite;
    }
    if data.is_empty() {
        return FileFormat::Unknown;
    }

    let complete = data.len() <= SNIFF_LIMIT;
    let sample = &data[..data.len().min(SNIFF_LIMIT)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // The sample may end inside a multi-byte character
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => {
            match std::str::from_utf8(&sample[..e.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return FileFormat::Unknown,
            }
        }
        Err(_) => return FileFormat::Unknown,
    };
    detect_text_sample(text, complete)
}

/// Classify an uploaded file: a known extension wins, an unknown one means
/// comma-delimited, and a missing or `.txt` extension falls back to the
/// content.
#[must_use]
pub fn detect_file(file_name: &str, data: &[u8]) -> FileFormat {
    match file_extension(file_name).as_deref() {
        None => sniff_bytes(data),
        Some("txt") => match sniff_bytes(data) {
            FileFormat::Unknown => FileFormat::Csv,
            sniffed => sniffed,
        },
        Some(ext) => FileFormat::from_extension(ext).unwrap_or(FileFormat::Csv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_text() {
        assert_eq!(detect_text(""), FileFormat::Csv);
        assert_eq!(detect_text("   \n"), FileFormat::Csv);
        assert_eq!(detect_text("a,b\n1,2\n"), FileFormat::Csv);
        assert_eq!(detect_text("a\tb\n1\t2\n"), FileFormat::Tsv);
        assert_eq!(detect_text("[{\"a\": 1}, {\"a\": 2}]"), FileFormat::Json);
        assert_eq!(detect_text("{\"a\": 1}"), FileFormat::Json);
        assert_eq!(detect_text("{\"a\": 1}\n\n{\"a\": 2}\n"), FileFormat::JsonLines);
        // Brace-led but not JSON
        assert_eq!(detect_text("{oops\nstill, not json"), FileFormat::Csv);
        // Tabs after the header line don't matter
        assert_eq!(detect_text("a,b\n1\t2\n"), FileFormat::Csv);
    }

    #[test]
    fn test_detect_file_by_extension() {
        assert_eq!(detect_file("sales.CSV", b""), FileFormat::Csv);
        assert_eq!(detect_file("sales.tsv", b"a,b"), FileFormat::Tsv);
        assert_eq!(detect_file("events.ndjson", b""), FileFormat::JsonLines);
        assert_eq!(detect_file("x.parquet", b""), FileFormat::Parquet);
        assert_eq!(detect_file("chinook.sqlite3", b""), FileFormat::Sqlite);
        assert_eq!(detect_file("report.xlsx", b"PAR1"), FileFormat::Csv);
    }

    #[test]
    fn test_detect_file_by_signature() {
        assert_eq!(detect_file("blob", b"PAR1\x15\x04"), FileFormat::Parquet);
        assert_eq!(
            detect_file("dump", b"SQLite format 3\0\x10\x00"),
            FileFormat::Sqlite
        );
        assert_eq!(detect_file("export.txt", b"a\tb\n1\t2"), FileFormat::Tsv);
        assert_eq!(detect_file("export.txt", b"\xff\xfe\x00"), FileFormat::Csv);
        assert_eq!(detect_file("noext", b"\xff\xfe\x00"), FileFormat::Unknown);
        assert_eq!(detect_file("noext", b""), FileFormat::Unknown);
    }

    #[test]
    fn test_truncated_json_sample() {
        let mut data = b"[".to_vec();
        while data.len() <= SNIFF_LIMIT {
            data.extend_from_slice(b"{\"k\": \"\xc3\xa9\xc3\xa9\"},");
        }
        data.extend_from_slice(b"{}]");
        assert_eq!(sniff_bytes(&data), FileFormat::Json);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.Csv").as_deref(), Some("csv"));
        assert_eq!(file_extension("dir.d/noext"), None);
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}

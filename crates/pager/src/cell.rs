// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;

/// Prefix the `md()` SQL macro puts in front of markdown text
pub const MARKDOWN_MAGIC: &str = "?|markdown|?\n";

/// Plain text longer than this is shortened for display
pub const TEXT_PREVIEW_CHARS: usize = 100;

/// How a single value should be shown in a result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Null,
    Markdown(&'a str),
    Text { text: String, truncated: bool },
}

pub fn render_cell(value: &Value) -> Cell<'_> {
    let text = match value {
        Value::Null => return Cell::Null,
        Value::String(s) => {
            if let Some(body) = s.strip_prefix(MARKDOWN_MAGIC) {
                return Cell::Markdown(body);
            }
            s.clone()
        }
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    };

    match text.char_indices().nth(TEXT_PREVIEW_CHARS) {
        Some((cut, _)) => Cell::Text {
            text: format!("{}...", &text[..cut]),
            truncated: true,
        },
        None => Cell::Text {
            text,
            truncated: false,
        },
    }
}

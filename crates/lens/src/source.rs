// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::sql::quote_ident;
use serde::{Deserialize, Serialize};

/// A named, queryable object backed by one stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// One table loaded from a delimited, JSON or columnar file
    Regular { name: String },

    /// A relational database file attached as a schema. `child_tables` is
    /// discovered at attach time and never empty.
    #[serde(rename = "sqlite")]
    RelationalAttachment {
        name: String,
        #[serde(rename = "schemaName")]
        schema_name: String,
        #[serde(rename = "tables")]
        child_tables: Vec<String>,
    },
}

impl DataSource {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DataSource::Regular { name } | DataSource::RelationalAttachment { name, .. } => name,
        }
    }

    #[must_use]
    pub fn is_attachment(&self) -> bool {
        matches!(self, DataSource::RelationalAttachment { .. })
    }

    #[must_use]
    pub fn child_tables(&self) -> &[String] {
        match self {
            DataSource::Regular { .. } => &[],
            DataSource::RelationalAttachment { child_tables, .. } => child_tables,
        }
    }

    /// SQL references for everything this source makes queryable
    #[must_use]
    pub fn query_targets(&self) -> Vec<String> {
        match self {
            DataSource::Regular { name } => vec![quote_ident(name)],
            DataSource::RelationalAttachment {
                schema_name,
                child_tables,
                ..
            } => child_tables
                .iter()
                .map(|table| format!("{}.{}", quote_ident(schema_name), quote_ident(table)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let attached = DataSource::RelationalAttachment {
            name: "chinook db".to_string(),
            schema_name: "chinook_db".to_string(),
            child_tables: vec!["albums".to_string(), "artists".to_string()],
        };
        let json = serde_json::to_value(&attached).unwrap();
        assert_eq!(json["type"], "sqlite");
        assert_eq!(json["schemaName"], "chinook_db");
        assert_eq!(json["tables"][1], "artists");

        let back: DataSource = serde_json::from_value(json).unwrap();
        assert_eq!(back, attached);

        let regular: DataSource =
            serde_json::from_str(r#"{"type":"regular","name":"sales"}"#).unwrap();
        assert_eq!(regular.name(), "sales");
        assert!(regular.child_tables().is_empty());
    }

    #[test]
    fn test_query_targets() {
        let attached = DataSource::RelationalAttachment {
            name: "c".to_string(),
            schema_name: "c".to_string(),
            child_tables: vec!["albums".to_string()],
        };
        assert_eq!(attached.query_targets(), vec!["\"c\".\"albums\""]);
        assert_eq!(
            DataSource::Regular {
                name: "sales".to_string()
            }
            .query_targets(),
            vec!["\"sales\""]
        );
    }
}

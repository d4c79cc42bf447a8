// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-in for the engine, for tests.
//!
//! [`ScriptedEngine`] interprets the statements built in [`crate::sql`]
//! against a toy catalog. Relational files are described up front with
//! [`ScriptedEngine::with_sqlite_fixture`], and any statement can be made
//! to fail with [`ScriptedEngine::fail_statement`].

use crate::engine::{Connection, Engine};
use crate::error::EngineError;
use arrow_array::{ArrayRef, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Script {
    locations: HashMap<String, String>,
    sqlite_fixtures: HashMap<String, Vec<String>>,
    rejected: HashSet<String>,
    failures: Vec<(String, EngineError)>,
    show_tables: Option<RecordBatch>,
    tables: BTreeSet<String>,
    attached: BTreeMap<String, Vec<String>>,
    statements: Vec<String>,
    open_connections: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedEngine {
    script: Arc<Mutex<Script>>,
}

impl ScriptedEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaching a file named `file_name` exposes `tables`
    #[must_use]
    pub fn with_sqlite_fixture(self, file_name: &str, tables: &[&str]) -> Self {
        let _ = self.script().sqlite_fixtures.insert(
            file_name.to_string(),
            tables.iter().map(|t| (*t).to_string()).collect(),
        );
        self
    }

    /// Reading a file named `file_name` fails as malformed input
    pub fn reject_file(&self, file_name: &str) {
        let _ = self.script().rejected.insert(file_name.to_string());
    }

    /// Statements starting with `prefix` fail with `err` until cleared
    pub fn fail_statement(&self, prefix: &str, err: EngineError) {
        self.script().failures.push((prefix.to_string(), err));
    }

    pub fn clear_failures(&self) {
        self.script().failures.clear();
    }

    /// Answer `SHOW TABLES` with `listing` instead of the catalog
    pub fn set_show_tables(&self, listing: RecordBatch) {
        self.script().show_tables = Some(listing);
    }

    /// Every statement issued, in order
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.script().statements.clone()
    }

    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        self.script().tables.iter().cloned().collect()
    }

    /// Attached schemas and their tables
    #[must_use]
    pub fn attached(&self) -> BTreeMap<String, Vec<String>> {
        self.script().attached.clone()
    }

    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.script().open_connections
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn register_bytes(&self, name: &str, _bytes: &[u8]) -> Result<String, EngineError> {
        let mut script = self.script();
        let location = format!("scripted://{}/{name}", script.locations.len());
        let _ = script.locations.insert(location.clone(), name.to_string());
        Ok(location)
    }

    async fn connect(&self) -> Result<Box<dyn Connection>, EngineError> {
        self.script().open_connections += 1;
        Ok(Box::new(ScriptedConnection {
            engine: self.clone(),
            schema: None,
            open: true,
        }))
    }
}

struct ScriptedConnection {
    engine: ScriptedEngine,
    schema: Option<String>,
    open: bool,
}

impl ScriptedConnection {
    /// Record the statement and apply any injected failure
    fn admit(&self, sql: &str) -> Result<MutexGuard<'_, Script>, EngineError> {
        if !self.open {
            return Err(EngineError::Closed);
        }
        let mut script = self.engine.script();
        script.statements.push(sql.to_string());
        if let Some((_, err)) = script
            .failures
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
        {
            return Err(err.clone());
        }
        Ok(script)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), EngineError> {
        let mut script = self.admit(sql)?;
        let unsupported = || EngineError::io(format!("Parser Error: unsupported statement {sql}"));

        if sql.starts_with("CREATE TABLE") {
            let table = quoted_ident(sql).ok_or_else(unsupported)?;
            let location = quoted_literal(sql).ok_or_else(unsupported)?;
            let file_name = script.locations.get(&location).cloned().unwrap_or_default();
            if script.rejected.contains(&file_name) {
                return Err(EngineError::classify(format!(
                    "Invalid Input Error: Malformed input in file \"{file_name}\""
                )));
            }
            if !script.tables.insert(table.clone()) {
                return Err(EngineError::classify(format!(
                    "Catalog Error: Table with name \"{table}\" already exists!"
                )));
            }
        } else if sql.starts_with("ATTACH") {
            let location = quoted_literal(sql).ok_or_else(unsupported)?;
            let schema = quoted_ident(sql).ok_or_else(unsupported)?;
            if script.attached.contains_key(&schema) {
                return Err(EngineError::classify(format!(
                    "Binder Error: Failed to attach database: database with name \"{schema}\" already exists"
                )));
            }
            let file_name = script.locations.get(&location).cloned().unwrap_or_default();
            let tables = script
                .sqlite_fixtures
                .get(&file_name)
                .cloned()
                .unwrap_or_default();
            let _ = script.attached.insert(schema, tables);
        } else if sql.starts_with("DETACH DATABASE IF EXISTS") {
            let schema = quoted_ident(sql).ok_or_else(unsupported)?;
            let _ = script.attached.remove(&schema);
        } else if sql.starts_with("DROP TABLE IF EXISTS") {
            let table = quoted_ident(sql).ok_or_else(unsupported)?;
            let _ = script.tables.remove(&table);
        } else if sql.starts_with("USE") {
            let schema = quoted_ident(sql).ok_or_else(unsupported)?;
            if !script.attached.contains_key(&schema) {
                return Err(EngineError::classify(format!(
                    "Catalog Error: Schema with name {schema} does not exist!"
                )));
            }
            drop(script);
            self.schema = Some(schema);
        } else {
            return Err(unsupported());
        }
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<RecordBatch, EngineError> {
        let script = self.admit(sql)?;
        if sql != crate::sql::SHOW_TABLES {
            return Err(EngineError::io(format!("Parser Error: unsupported query {sql}")));
        }
        if let Some(listing) = &script.show_tables {
            return Ok(listing.clone());
        }

        let names: Vec<String> = match &self.schema {
            Some(schema) => script.attached.get(schema).cloned().unwrap_or_default(),
            None => script.tables.iter().cloned().collect(),
        };
        let schema = Arc::new(Schema::new(vec![Field::new("name", DataType::Utf8, false)]));
        let column: ArrayRef = Arc::new(StringArray::from(names));
        RecordBatch::try_new(schema, vec![column]).map_err(|e| EngineError::io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if self.open {
            self.open = false;
            self.engine.script().open_connections -= 1;
        }
        Ok(())
    }
}

/// First double-quoted identifier in `sql`
fn quoted_ident(sql: &str) -> Option<String> {
    quoted(sql, '"')
}

/// First single-quoted literal in `sql`
fn quoted_literal(sql: &str) -> Option<String> {
    quoted(sql, '\'')
}

fn quoted(sql: &str, quote: char) -> Option<String> {
    let start = sql.find(quote)? + quote.len_utf8();
    let mut chars = sql[start..].chars().peekable();
    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == quote {
            if chars.peek() == Some(&quote) {
                let _ = chars.next();
            } else {
                return Some(value);
            }
        }
        value.push(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql;

    #[test]
    fn test_quoted() {
        assert_eq!(quoted_ident("DROP TABLE IF EXISTS \"a\"\"b\"").as_deref(), Some("a\"b"));
        assert_eq!(
            quoted_literal(&sql::attach_sqlite("it's.db", "s")).as_deref(),
            Some("it's.db")
        );
        assert_eq!(quoted_ident("SHOW TABLES"), None);
    }

    #[tokio::test]
    async fn test_catalog() {
        let engine = ScriptedEngine::new().with_sqlite_fixture("shop.db", &["orders"]);
        let location = engine.register_bytes("shop.db", b"").await.unwrap();

        let mut conn = engine.connect().await.unwrap();
        conn.execute(&sql::attach_sqlite(&location, "shop")).await.unwrap();
        conn.execute(&sql::use_schema("shop")).await.unwrap();
        let listing = conn.query(sql::SHOW_TABLES).await.unwrap();
        assert_eq!(listing.num_rows(), 1);
        assert_eq!(engine.open_connections(), 1);
        conn.close().await.unwrap();
        assert_eq!(engine.open_connections(), 0);
    }
}

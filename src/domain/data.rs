//! Mutable in-memory data snapshot a domain's tools read and write.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{DomainError, ToolError};

/// Zero-argument factory yielding a brand-new snapshot on every call.
pub type DataLoader = Arc<dyn Fn() -> Result<DomainData, DomainError> + Send + Sync>;

/// A set of named tables, each a JSON object keyed by record id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainData {
    tables: Map<String, Value>,
}

impl DomainData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn with_table(mut self, name: impl Into<String>, records: Map<String, Value>) -> Self {
        self.tables.insert(name.into(), Value::Object(records));
        self
    }

    /// Load `<dir>/<table>.json` for each table name.
    ///
    /// Every file must exist and hold a JSON object.
    pub fn load_dir(domain: &str, dir: &Path, tables: &[&str]) -> Result<Self, DomainError> {
        let mut data = Self::new();
        for table in tables {
            let path = table_path(dir, table);
            let raw = fs::read_to_string(&path)?;
            let value: Value =
                serde_json::from_str(&raw).map_err(|source| DomainError::InvalidArtifact {
                    domain: domain.to_string(),
                    artifact: format!("data table '{}'", table),
                    source,
                })?;
            match value {
                Value::Object(records) => data = data.with_table(*table, records),
                _ => {
                    return Err(DomainError::InvalidTable {
                        table: table.to_string(),
                    })
                }
            }
        }
        Ok(data)
    }

    pub fn table(&self, name: &str) -> Result<&Map<String, Value>, ToolError> {
        self.tables
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| ToolError::MissingTable(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Map<String, Value>, ToolError> {
        self.tables
            .get_mut(name)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ToolError::MissingTable(name.to_string()))
    }

    /// Look up one record by id.
    pub fn record(&self, table: &str, id: &str) -> Result<Option<&Value>, ToolError> {
        Ok(self.table(table)?.get(id))
    }

    pub fn record_mut(&mut self, table: &str, id: &str) -> Result<Option<&mut Value>, ToolError> {
        Ok(self.table_mut(table)?.get_mut(id))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

pub(crate) fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.json", table))
}

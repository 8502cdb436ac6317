//! Normalized schema/table/column records

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Keep only ASCII letters and underscores
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '_')
        .collect()
}

/// A `schema.table` pair as written in a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse from a dotted token like "sales.orders"; everything after the
    /// first `.` is the table part
    pub fn parse(token: &str) -> Option<Self> {
        token
            .split_once('.')
            .map(|(schema, table)| Self::new(schema.trim(), table.trim()))
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// One statement's contribution to the inventory.
///
/// Construction applies the column-recording rules: the table name loses
/// any `(` suffix, qualified column tokens win over unqualified ones, and
/// every name is reduced to `[a-zA-Z_]`. Empty columns are dropped; an empty
/// schema or table makes the record invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
}

impl ParsedRecord {
    pub fn new<I, S>(schema: &str, table: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = table.split('(').next().unwrap_or_default();
        let schema = sanitize_identifier(schema);
        let table = sanitize_identifier(table);
        if schema.is_empty() {
            return Err(ParseError::malformed("empty schema name"));
        }
        if table.is_empty() {
            return Err(ParseError::malformed("empty table name"));
        }

        let raw: Vec<String> = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .collect();
        let qualified_only = raw.iter().any(|c| c.contains('.'));

        let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
        for column in &raw {
            if qualified_only && !column.contains('.') {
                continue;
            }
            let bare = column.rsplit('.').next().unwrap_or(column.as_str());
            let name = sanitize_identifier(bare);
            if !name.is_empty() && !cleaned.contains(&name) {
                cleaned.push(name);
            }
        }

        Ok(Self {
            schema,
            table,
            columns: cleaned,
        })
    }

    pub fn table_name(&self) -> TableName {
        TableName::new(self.schema.clone(), self.table.clone())
    }
}

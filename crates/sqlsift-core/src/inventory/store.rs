//! Inventory store - schema -> table -> column set

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inventory::ParsedRecord;

/// Accumulated schema/table/column inventory.
///
/// Serializes as a nested object `{ schema: { table: [column, ...] } }`.
/// Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    schemas: IndexMap<String, SchemaTables>,
}

/// Tables seen in one schema, with their referenced columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTables {
    tables: IndexMap<String, IndexSet<String>>,
}

impl SchemaTables {
    pub fn columns(&self, table: &str) -> Option<&IndexSet<String>> {
        self.tables.get(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.tables.iter().map(|(name, cols)| (name.as_str(), cols))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and merge one statement's columns.
    ///
    /// Fails without touching the inventory when the schema or table name
    /// is empty after normalization.
    pub fn record_columns<I, S>(&mut self, schema: &str, table: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let record = ParsedRecord::new(schema, table, columns)?;
        self.record(&record);
        Ok(())
    }

    /// Merge an already normalized record (set union)
    pub fn record(&mut self, record: &ParsedRecord) {
        let columns = self
            .schemas
            .entry(record.schema.clone())
            .or_default()
            .tables
            .entry(record.table.clone())
            .or_default();
        columns.extend(record.columns.iter().cloned());
    }

    /// Set-union another inventory into this one
    pub fn merge(&mut self, other: &Inventory) {
        for (schema_name, schema) in &other.schemas {
            let target = self.schemas.entry(schema_name.clone()).or_default();
            for (table_name, columns) in &schema.tables {
                target
                    .tables
                    .entry(table_name.clone())
                    .or_default()
                    .extend(columns.iter().cloned());
            }
        }
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.schemas = IndexMap::new();
    }

    pub fn schemas(&self) -> impl Iterator<Item = (&str, &SchemaTables)> {
        self.schemas.iter().map(|(name, tables)| (name.as_str(), tables))
    }

    pub fn columns(&self, schema: &str, table: &str) -> Option<&IndexSet<String>> {
        self.schemas.get(schema).and_then(|s| s.columns(table))
    }

    pub fn contains_table(&self, schema: &str, table: &str) -> bool {
        self.columns(schema, table).is_some()
    }

    pub fn contains(&self, schema: &str, table: &str, column: &str) -> bool {
        self.columns(schema, table)
            .is_some_and(|cols| cols.contains(column))
    }

    pub fn table_count(&self) -> usize {
        self.schemas.values().map(SchemaTables::len).sum()
    }

    pub fn column_count(&self) -> usize {
        self.schemas
            .values()
            .flat_map(|s| s.tables.values())
            .map(IndexSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_columns_creates_levels() {
        let mut inventory = Inventory::new();
        inventory
            .record_columns("sales", "orders", ["id", "total"])
            .unwrap();

        assert!(inventory.contains("sales", "orders", "id"));
        assert!(inventory.contains("sales", "orders", "total"));
        assert_eq!(inventory.table_count(), 1);
    }

    #[test]
    fn test_record_columns_is_a_set_union() {
        let mut inventory = Inventory::new();
        inventory.record_columns("s", "t", ["a", "b"]).unwrap();
        inventory.record_columns("s", "t", ["b", "c"]).unwrap();

        assert_eq!(inventory.column_count(), 3);
    }

    #[test]
    fn test_invalid_record_leaves_inventory_untouched() {
        let mut inventory = Inventory::new();
        assert!(inventory.record_columns("s", "", ["a"]).is_err());
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_merge_and_reset() {
        let mut left = Inventory::new();
        left.record_columns("s", "t", ["a"]).unwrap();
        let mut right = Inventory::new();
        right.record_columns("s", "t", ["b"]).unwrap();
        right.record_columns("x", "y", ["z"]).unwrap();

        left.merge(&right);
        assert!(left.contains("s", "t", "a"));
        assert!(left.contains("s", "t", "b"));
        assert!(left.contains("x", "y", "z"));

        left.reset();
        assert!(left.is_empty());
    }
}

//! Schema catalog collaborator.
//!
//! Quota rules need ground truth about the database: how many indexes a
//! table carries, how many rows it holds, whether a database is empty. The
//! [`Catalog`] trait is the narrow query interface they consult;
//! [`MemoryCatalog`] is the snapshot implementation the advisor advances
//! ("walks through") with the very statements being checked, so quota rules
//! observe post-statement object counts.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::tree::{ConstraintKind, Node, NodeBody};

/// One index on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMeta {
    pub name: String,
    pub unique: bool,
    pub column_count: usize,
}

/// One table in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMeta {
    pub name: String,
    pub row_count: u64,
    pub indexes: Vec<IndexMeta>,
}

/// Read-only schema queries available to rules.
pub trait Catalog {
    fn table(&self, name: &str) -> Option<&TableMeta>;

    /// All table names, sorted.
    fn table_names(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.table_names().is_empty()
    }

    fn index_count(&self, table: &str) -> usize {
        self.table(table).map_or(0, |meta| meta.indexes.len())
    }
}

/// Walkthrough failure. Non-fatal for a check: the advisor logs it and
/// degrades quota rules to no-catalog mode.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("table {0:?} does not exist in the catalog")]
    TableNotFound(String),
}

/// Mutable in-memory schema snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: BTreeMap<String, TableMeta>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table into the snapshot, replacing any existing entry.
    pub fn add_table(&mut self, meta: TableMeta) {
        self.tables.insert(meta.name.clone(), meta);
    }

    pub fn set_row_count(&mut self, table: &str, row_count: u64) {
        if let Some(meta) = self.tables.get_mut(table) {
            meta.row_count = row_count;
        }
    }

    /// Advances the snapshot past one checked statement's DDL effects.
    ///
    /// Only object-level effects are tracked (tables, indexes); column-level
    /// bookkeeping is outside the quota rules' interface.
    pub fn walk_through(&mut self, root: &Node) -> Result<(), CatalogError> {
        match &root.body {
            NodeBody::CreateTable {
                table,
                if_not_exists,
            } => {
                if self.tables.contains_key(table) && *if_not_exists {
                    return Ok(());
                }
                let mut meta = TableMeta {
                    name: table.clone(),
                    ..TableMeta::default()
                };
                for child in &root.children {
                    if let NodeBody::TableConstraint {
                        kind,
                        name,
                        column_count,
                    } = &child.body
                    {
                        if let Some(index) = constraint_index(*kind, name.as_deref(), *column_count)
                        {
                            meta.indexes.push(index);
                        }
                    }
                }
                self.tables.insert(table.clone(), meta);
            }

            NodeBody::CreateIndex {
                index,
                table,
                unique,
                column_count,
            } => {
                let meta = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| CatalogError::TableNotFound(table.clone()))?;
                meta.indexes.push(IndexMeta {
                    name: index.clone().unwrap_or_default(),
                    unique: *unique,
                    column_count: *column_count,
                });
            }

            NodeBody::AlterTable { table } => {
                let meta = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| CatalogError::TableNotFound(table.clone()))?;
                let mut renamed_to = None;
                for child in &root.children {
                    match &child.body {
                        NodeBody::AddConstraint {
                            kind,
                            name,
                            column_count,
                        } => {
                            if let Some(index) =
                                constraint_index(*kind, name.as_deref(), *column_count)
                            {
                                meta.indexes.push(index);
                            }
                        }
                        NodeBody::DropConstraint { name } => {
                            meta.indexes.retain(|index| index.name != *name);
                        }
                        NodeBody::RenameTable { to, .. } => {
                            renamed_to = Some(to.clone());
                        }
                        _ => {}
                    }
                }
                if let Some(to) = renamed_to {
                    if let Some(mut meta) = self.tables.remove(table) {
                        meta.name = to.clone();
                        self.tables.insert(to, meta);
                    }
                }
            }

            NodeBody::RenameTable { table, to } => {
                if let Some(mut meta) = self.tables.remove(table) {
                    meta.name = to.clone();
                    self.tables.insert(to.clone(), meta);
                }
            }

            NodeBody::DropTable { tables } => {
                for table in tables {
                    self.tables.remove(table);
                }
            }

            NodeBody::DropIndex { indexes } => {
                for meta in self.tables.values_mut() {
                    meta.indexes.retain(|index| !indexes.contains(&index.name));
                }
            }

            NodeBody::DropDatabase { .. } => {
                self.tables.clear();
            }

            _ => {}
        }

        Ok(())
    }
}

impl Catalog for MemoryCatalog {
    fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(name)
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Maps an index-creating constraint to its catalog entry. CHECK and FOREIGN
/// KEY constraints do not create indexes.
fn constraint_index(
    kind: ConstraintKind,
    name: Option<&str>,
    column_count: usize,
) -> Option<IndexMeta> {
    match kind {
        ConstraintKind::PrimaryKey => Some(IndexMeta {
            name: name.unwrap_or("PRIMARY").to_string(),
            unique: true,
            column_count,
        }),
        ConstraintKind::Unique => Some(IndexMeta {
            name: name.unwrap_or_default().to_string(),
            unique: true,
            column_count,
        }),
        ConstraintKind::Index => Some(IndexMeta {
            name: name.unwrap_or_default().to_string(),
            unique: false,
            column_count,
        }),
        ConstraintKind::ForeignKey | ConstraintKind::Check => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{split_statements, Dialect};
    use crate::tree::lower_statement;

    fn advance(catalog: &mut MemoryCatalog, sql: &str) -> Result<(), CatalogError> {
        for statement in split_statements(sql, Dialect::Mysql).expect("parse") {
            catalog.walk_through(&lower_statement(&statement.ast))?;
        }
        Ok(())
    }

    #[test]
    fn create_table_records_inline_indexes() {
        let mut catalog = MemoryCatalog::new();
        advance(
            &mut catalog,
            "CREATE TABLE t (id INT, a INT, PRIMARY KEY (id), UNIQUE KEY uk_a (a))",
        )
        .expect("walkthrough");
        assert_eq!(catalog.index_count("t"), 2);
    }

    #[test]
    fn column_level_keys_count_as_indexes() {
        let mut catalog = MemoryCatalog::new();
        advance(
            &mut catalog,
            "CREATE TABLE t (id INT PRIMARY KEY, email VARCHAR(64) UNIQUE)",
        )
        .expect("walkthrough");
        assert_eq!(catalog.index_count("t"), 2);
        advance(&mut catalog, "ALTER TABLE t ADD COLUMN code CHAR(8) UNIQUE")
            .expect("walkthrough");
        assert_eq!(catalog.index_count("t"), 3);
    }

    #[test]
    fn create_index_requires_existing_table() {
        let mut catalog = MemoryCatalog::new();
        let err = advance(&mut catalog, "CREATE INDEX idx ON missing (a)")
            .expect_err("table is unknown");
        assert!(matches!(err, CatalogError::TableNotFound(name) if name == "missing"));
    }

    #[test]
    fn walkthrough_sees_post_statement_counts() {
        let mut catalog = MemoryCatalog::new();
        advance(
            &mut catalog,
            "CREATE TABLE t (id INT); CREATE INDEX i1 ON t (id); CREATE UNIQUE INDEX i2 ON t (id)",
        )
        .expect("walkthrough");
        assert_eq!(catalog.index_count("t"), 2);
        assert!(catalog.table("t").unwrap().indexes[1].unique);
    }

    #[test]
    fn drop_and_rename_are_applied() {
        let mut catalog = MemoryCatalog::new();
        advance(&mut catalog, "CREATE TABLE a (id INT); CREATE TABLE b (id INT)")
            .expect("walkthrough");
        advance(&mut catalog, "DROP TABLE a; ALTER TABLE b RENAME TO c").expect("walkthrough");
        assert_eq!(catalog.table_names(), ["c"]);
    }
}

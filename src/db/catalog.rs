//! Table name validation against the live SQLite catalog.

use crate::db::sqlite::SqlitePool;
use crate::error::QrgenError;
use std::fmt;

const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// A table name that existed in the catalog when it was resolved.
///
/// Only [`TableRegistry::resolve`] constructs one, and the store only ever
/// emits it through [`TableName::quoted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SQL identifier form: wrapped in double quotes, embedded quotes doubled.
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Looks table names up in `sqlite_master`. Every call re-queries the catalog.
#[derive(Clone)]
pub struct TableRegistry {
    pool: SqlitePool,
}

impl TableRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_tables(&self) -> Result<Vec<String>, QrgenError> {
        let rows: Vec<(String,)> = sqlx::query_as(LIST_TABLES).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn table_exists(&self, name: &str) -> Result<bool, QrgenError> {
        Ok(self.list_tables().await?.iter().any(|t| t == name))
    }

    /// Turn a caller-supplied name into a [`TableName`], or report what exists.
    pub async fn resolve(&self, name: &str) -> Result<TableName, QrgenError> {
        let available = self.list_tables().await?;
        match available.iter().find(|t| t.as_str() == name) {
            Some(t) => Ok(TableName(t.clone())),
            None => Err(QrgenError::UnknownTable {
                name: name.to_string(),
                available,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::{connect_memory, create_record_table};

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("it"), "\"it\"");
        assert_eq!(
            quote_identifier("it\"; DROP TABLE it; --"),
            "\"it\"\"; DROP TABLE it; --\""
        );
    }

    #[tokio::test]
    async fn resolve_reports_available_tables() {
        let pool = connect_memory().await.unwrap();
        create_record_table(&pool, "it").await.unwrap();
        create_record_table(&pool, "stores").await.unwrap();
        let registry = TableRegistry::new(pool);

        assert_eq!(registry.list_tables().await.unwrap(), vec!["it", "stores"]);
        assert!(registry.table_exists("it").await.unwrap());
        assert!(!registry.table_exists("nope").await.unwrap());

        let table = registry.resolve("stores").await.unwrap();
        assert_eq!(table.as_str(), "stores");

        match registry.resolve("nope").await {
            Err(QrgenError::UnknownTable { name, available }) => {
                assert_eq!(name, "nope");
                assert_eq!(available, vec!["it", "stores"]);
            }
            other => panic!("expected UnknownTable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn registry_sees_tables_created_later() {
        let pool = connect_memory().await.unwrap();
        let registry = TableRegistry::new(pool.clone());
        assert!(!registry.table_exists("late").await.unwrap());

        create_record_table(&pool, "late").await.unwrap();
        assert!(registry.table_exists("late").await.unwrap());
    }

    #[tokio::test]
    async fn empty_name_never_resolves() {
        let pool = connect_memory().await.unwrap();
        create_record_table(&pool, "it").await.unwrap();
        let registry = TableRegistry::new(pool);
        assert!(matches!(
            registry.resolve("").await,
            Err(QrgenError::UnknownTable { .. })
        ));
    }
}

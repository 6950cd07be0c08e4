use crate::db::catalog::{TableName, TableRegistry, quote_identifier};
use crate::db::models::{NewRecord, Record};
use crate::db::schema::record_table_ddl;
use crate::error::QrgenError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub type SqlitePool = Pool<Sqlite>;

/// Open the pool and check the database answers before the server starts.
pub async fn connect(database_url: &str) -> Result<SqlitePool, QrgenError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(connect_opts)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    info!(database_url = %database_url, "database connected");
    Ok(pool)
}

/// Single-connection in-memory database. Every connection to `:memory:` is a
/// separate database, so the pool must never open a second one or drop the first.
pub async fn connect_memory() -> Result<SqlitePool, QrgenError> {
    let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

/// Create a record table with the standard layout if it does not exist yet.
pub async fn create_record_table(pool: &SqlitePool, name: &str) -> Result<(), QrgenError> {
    let ddl = record_table_ddl(&quote_identifier(name));
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Startup schema pass: make sure `default_table` exists, then report what the
/// catalog holds. Returns the table names found.
pub async fn init_schema(
    pool: &SqlitePool,
    default_table: &str,
    api_table: &str,
) -> Result<Vec<String>, QrgenError> {
    create_record_table(pool, default_table).await?;
    let tables = TableRegistry::new(pool.clone()).list_tables().await?;
    info!(tables = ?tables, "available tables");
    if !tables.iter().any(|t| t == api_table) {
        warn!(
            api_table = %api_table,
            "api table not found; /api/item lookups will return 404"
        );
    }
    Ok(tables)
}

/// Inserts and reads records in catalog-validated tables.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a row and return its assigned `s_no`.
    pub async fn insert(&self, table: &TableName, rec: &NewRecord) -> Result<i64, QrgenError> {
        let sql = format!(
            "INSERT INTO {} (lp_no, items, issue_voucher_number) VALUES (?, ?, ?)",
            table.quoted()
        );
        let result = sqlx::query(&sql)
            .bind(rec.lp_no())
            .bind(rec.items())
            .bind(rec.issue_voucher_number())
            .execute(&self.pool)
            .await?;
        let s_no = result.last_insert_rowid();
        debug!(table = %table, s_no, "record inserted");
        Ok(s_no)
    }

    pub async fn get_by_id(&self, table: &TableName, id: i64) -> Result<Option<Record>, QrgenError> {
        let sql = format!(
            "SELECT s_no, lp_no, items, issue_voucher_number FROM {} WHERE s_no = ?",
            table.quoted()
        );
        let rec = sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    /// All rows, ascending by `s_no`.
    pub async fn list_all(&self, table: &TableName) -> Result<Vec<Record>, QrgenError> {
        let sql = format!(
            "SELECT s_no, lp_no, items, issue_voucher_number FROM {} ORDER BY s_no ASC",
            table.quoted()
        );
        let rows = sqlx::query_as::<_, Record>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

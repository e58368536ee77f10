//! SQLite implementation of the source store.
//!
//! SQLite is dynamically typed per cell, so rows are decoded by the storage
//! class each value actually has rather than by the declared column type.
use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use migrator_shared::types::{RawValue, SourceRow};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{debug, instrument};

use crate::errors::SourceStoreError;
use crate::utils::quote_identifier;
use crate::SourceStore;

/// SQLite-backed source store.
///
/// Opened read-only with a single connection; the migrator never writes to
/// the source.
pub struct SqliteSourceStore {
    pool: SqlitePool,
}

impl SqliteSourceStore {
    /// Wraps an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Pool pointing at the source database
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the source database read-only.
    ///
    /// # Arguments
    ///
    /// * `url` - A `sqlite:` connection URL
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSourceStore)` - Ready-to-use store
    /// * `Err(SourceStoreError)` - The URL is malformed or the file cannot be opened
    pub async fn connect(url: &str) -> Result<Self, SourceStoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    fn quoted(table: &str) -> Result<String, SourceStoreError> {
        quote_identifier(table).ok_or_else(|| SourceStoreError::InvalidIdentifier(table.to_string()))
    }
}

/// Decodes one row into raw values using each cell's storage class.
fn decode_row(table: &str, row: &SqliteRow) -> Result<SourceRow, SourceStoreError> {
    let mut columns = Vec::with_capacity(row.len());

    for column in row.columns() {
        let index = column.ordinal();
        let (is_null, storage_class) = {
            let raw = row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };

        let value = if is_null {
            RawValue::Null
        } else {
            match storage_class.as_str() {
                "INTEGER" | "BOOLEAN" => RawValue::Integer(row.try_get::<i64, _>(index)?),
                "REAL" => RawValue::Real(row.try_get::<f64, _>(index)?),
                "TEXT" => RawValue::Text(row.try_get::<String, _>(index)?),
                "BLOB" => RawValue::Blob(row.try_get::<Vec<u8>, _>(index)?),
                other => {
                    let text = row.try_get_unchecked::<String, _>(index).map_err(|e| {
                        SourceStoreError::UnsupportedValue {
                            table: table.to_string(),
                            column: column.name().to_string(),
                            reason: format!("storage class {other}: {e}"),
                        }
                    })?;
                    RawValue::Text(text)
                }
            }
        };

        columns.push((column.name().to_string(), value));
    }

    Ok(SourceRow::new(columns))
}

#[async_trait]
impl SourceStore for SqliteSourceStore {
    async fn list_tables(&self) -> Result<BTreeSet<String>, SourceStoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn fetch_all(&self, table: &str) -> Result<Vec<SourceRow>, SourceStoreError> {
        let sql = format!("SELECT * FROM {}", Self::quoted(table)?);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        debug!(row_count = rows.len(), "Read source rows");

        rows.iter().map(|row| decode_row(table, row)).collect()
    }

    async fn count(&self, table: &str) -> Result<i64, SourceStoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::quoted(table)?);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn first_row(&self, table: &str) -> Result<Option<SourceRow>, SourceStoreError> {
        let sql = format!("SELECT * FROM {} LIMIT 1", Self::quoted(table)?);
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

        row.as_ref().map(|row| decode_row(table, row)).transpose()
    }
}

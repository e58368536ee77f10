//! PostgreSQL implementation of the target store.
//!
//! Holds a single connection for the lifetime of a run so that
//! `session_replication_role` (which disables foreign-key triggers) applies to
//! every insert issued through the store.
//!
//! ## Key Features
//!
//! - Conflict-skipping inserts with `ON CONFLICT DO NOTHING`
//! - Typed null binding driven by the declared field type
//! - Sequence resynchronization for serial and identity columns
//! - Textual reads (`::text`) for verification, independent of column types
use std::collections::BTreeSet;

use async_trait::async_trait;
use migrator_shared::types::{CanonicalValue, FieldType, TextRow, TypedValue};
use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Postgres, Row};
use tracing::{debug, instrument, warn};

use crate::errors::TargetStoreError;
use crate::utils::quote_identifier;
use crate::{InsertOutcome, TargetStore};

/// SQLSTATE raised when the session lacks the privilege for an operation.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// PostgreSQL-backed target store.
pub struct PostgresTargetStore {
    conn: PgConnection,
}

impl PostgresTargetStore {
    /// Wraps an open connection.
    ///
    /// The session time zone is expected to be UTC; use [`Self::connect`] to
    /// have it set.
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Opens the target connection and pins the session time zone to UTC.
    ///
    /// Timestamps are bound as `timestamptz`; with a UTC session they land in
    /// `timestamp without time zone` columns unshifted.
    ///
    /// # Arguments
    ///
    /// * `url` - A `postgres://` connection URL
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresTargetStore)` - Ready-to-use store
    /// * `Err(TargetStoreError)` - Connection failure
    pub async fn connect(url: &str) -> Result<Self, TargetStoreError> {
        let mut conn = PgConnection::connect(url).await?;
        sqlx::query("SET TIME ZONE 'UTC'").execute(&mut conn).await?;
        Ok(Self { conn })
    }

    /// Closes the underlying connection gracefully.
    pub async fn close(self) -> Result<(), TargetStoreError> {
        self.conn.close().await?;
        Ok(())
    }

    fn quoted(name: &str) -> Result<String, TargetStoreError> {
        quote_identifier(name).ok_or_else(|| TargetStoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Binds a typed value, giving nulls the parameter type of the declared field.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &TypedValue,
) -> Query<'q, Postgres, PgArguments> {
    match &value.value {
        Some(CanonicalValue::Text(s)) => query.bind(s.clone()),
        Some(CanonicalValue::Integer(i)) => query.bind(*i),
        Some(CanonicalValue::Real(r)) => query.bind(*r),
        Some(CanonicalValue::Boolean(b)) => query.bind(*b),
        Some(CanonicalValue::Timestamp(t)) => query.bind(*t),
        None => match value.field_type {
            FieldType::Text => query.bind(None::<String>),
            FieldType::Integer => query.bind(None::<i64>),
            FieldType::Real => query.bind(None::<f64>),
            FieldType::Boolean => query.bind(None::<bool>),
            FieldType::Timestamp => query.bind(None::<chrono::DateTime<chrono::Utc>>),
        },
    }
}

fn is_insufficient_privilege(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == INSUFFICIENT_PRIVILEGE)
}

#[async_trait]
impl TargetStore for PostgresTargetStore {
    async fn list_tables(&mut self) -> Result<BTreeSet<String>, TargetStoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(names.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn set_integrity_enforcement(&mut self, enabled: bool) -> Result<bool, TargetStoreError> {
        let role = if enabled { "origin" } else { "replica" };
        let sql = format!("SET session_replication_role = {role}");

        match sqlx::query(&sql).execute(&mut self.conn).await {
            Ok(_) => {
                debug!(role, "Applied session replication role");
                Ok(true)
            }
            Err(e) if is_insufficient_privilege(&e) => {
                debug!(error = %e, "Integrity enforcement toggle not permitted");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn truncate_cascade(&mut self, table: &str) -> Result<(), TargetStoreError> {
        let sql = format!("TRUNCATE TABLE {} CASCADE", Self::quoted(table)?);
        sqlx::query(&sql).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[TypedValue],
    ) -> Result<InsertOutcome, TargetStoreError> {
        if columns.len() != values.len() {
            return Err(TargetStoreError::ArityMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let column_list = columns
            .iter()
            .map(|c| Self::quoted(c))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders}) ON CONFLICT DO NOTHING",
            Self::quoted(table)?
        );

        let query = values
            .iter()
            .fold(sqlx::query(&sql), |query, value| bind_value(query, value));
        let result = query.execute(&mut self.conn).await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    #[instrument(skip(self))]
    async fn reset_sequences(&mut self) -> Result<Vec<String>, TargetStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT c.table_name::text AS table_name,
                   c.column_name::text AS column_name,
                   pg_get_serial_sequence(quote_ident(c.table_name::text), c.column_name::text) AS sequence_name
            FROM information_schema.columns c
            WHERE c.table_schema = current_schema()
              AND (c.column_default LIKE 'nextval(%' OR c.is_identity = 'YES')
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        let mut reset = Vec::new();
        for row in rows {
            let table: String = row.try_get("table_name")?;
            let column: String = row.try_get("column_name")?;
            let Some(sequence) = row.try_get::<Option<String>, _>("sequence_name")? else {
                continue;
            };

            let column_ident = Self::quoted(&column)?;
            let sql = format!(
                "SELECT setval($1::regclass, COALESCE(MAX({column_ident})::bigint, 1), MAX({column_ident}) IS NOT NULL) FROM {}",
                Self::quoted(&table)?
            );

            match sqlx::query(&sql).bind(sequence.as_str()).execute(&mut self.conn).await {
                Ok(_) => {
                    debug!(sequence = %sequence, table = %table, column = %column, "Reset sequence");
                    reset.push(sequence);
                }
                Err(e) => warn!(sequence = %sequence, error = %e, "Failed to reset sequence"),
            }
        }

        Ok(reset)
    }

    async fn count(&mut self, table: &str) -> Result<i64, TargetStoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::quoted(table)?);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut self.conn).await?;
        Ok(count)
    }

    async fn fetch_text_row(
        &mut self,
        table: &str,
        id_column: &str,
        id_value: &str,
        columns: &[String],
    ) -> Result<Option<TextRow>, TargetStoreError> {
        if columns.is_empty() {
            return Ok(None);
        }

        let select_list = columns
            .iter()
            .map(|c| Self::quoted(c).map(|q| format!("{q}::text AS {q}")))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let sql = format!(
            "SELECT {select_list} FROM {} WHERE {}::text = $1 LIMIT 1",
            Self::quoted(table)?,
            Self::quoted(id_column)?
        );

        let Some(row) = sqlx::query(&sql)
            .bind(id_value)
            .fetch_optional(&mut self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut text_row = TextRow::with_capacity(columns.len());
        for column in columns {
            let value: Option<String> = row.try_get(column.as_str())?;
            text_row.insert(column.clone(), value);
        }

        Ok(Some(text_row))
    }

    async fn distinct_text_values(
        &mut self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> Result<Vec<String>, TargetStoreError> {
        let column_ident = Self::quoted(column)?;
        let sql = format!(
            "SELECT DISTINCT {column_ident}::text FROM {} WHERE {column_ident} IS NOT NULL LIMIT $1",
            Self::quoted(table)?
        );

        let values: Vec<String> = sqlx::query_scalar(&sql)
            .bind(limit)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(values)
    }
}

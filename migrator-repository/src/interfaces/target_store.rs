//! This module defines the `TargetStore` trait, the read-write view of the
//! store being migrated into.
use std::collections::BTreeSet;

use migrator_shared::types::{TextRow, TypedValue};

use crate::errors::TargetStoreError;

/// Result of a single conflict-skipping row insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The row collided with a uniqueness constraint and was left untouched.
    Conflict,
}

/// A trait that defines the interface for writing to and inspecting the target store.
///
/// One implementor instance holds one connection for the whole run, so
/// session-level settings such as integrity enforcement apply to every call
/// made through it.
#[async_trait::async_trait]
pub trait TargetStore: Send {
    /// Lists the names of the tables that exist in the target.
    async fn list_tables(&mut self) -> Result<BTreeSet<String>, TargetStoreError>;

    /// Turns referential-integrity enforcement on or off for this session.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The setting was applied
    /// * `Ok(false)` - The capability is unavailable (e.g. insufficient privilege)
    /// * `Err(TargetStoreError)` - Any other failure
    async fn set_integrity_enforcement(&mut self, enabled: bool) -> Result<bool, TargetStoreError>;

    /// Removes every row of `table`, cascading to referencing tables.
    async fn truncate_cascade(&mut self, table: &str) -> Result<(), TargetStoreError>;

    /// Inserts one row, skipping it when it violates a uniqueness constraint.
    ///
    /// # Arguments
    ///
    /// * `table` - Target table name
    /// * `columns` - Column names, in the same order as `values`
    /// * `values` - Canonical values with their declared types
    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[TypedValue],
    ) -> Result<InsertOutcome, TargetStoreError>;

    /// Resynchronizes auto-increment sequences with the data now present.
    ///
    /// Returns the names of the sequences that were reset.
    async fn reset_sequences(&mut self) -> Result<Vec<String>, TargetStoreError>;

    /// Counts the rows of `table`.
    async fn count(&mut self, table: &str) -> Result<i64, TargetStoreError>;

    /// Fetches the row whose `id_column` equals `id_value`, reading every
    /// requested column in its textual form.
    async fn fetch_text_row(
        &mut self,
        table: &str,
        id_column: &str,
        id_value: &str,
        columns: &[String],
    ) -> Result<Option<TextRow>, TargetStoreError>;

    /// Returns up to `limit` distinct non-null values of `column`, in textual form.
    ///
    /// This is a sample, not a scan: when the column holds more than `limit`
    /// distinct values, which ones are returned is unspecified. A validity
    /// check that passes on this sample says nothing about the values left out.
    async fn distinct_text_values(
        &mut self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> Result<Vec<String>, TargetStoreError>;
}

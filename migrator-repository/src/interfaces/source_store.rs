//! This module defines the `SourceStore` trait, the read-only view of the
//! store being migrated from.
use std::collections::BTreeSet;

use migrator_shared::types::SourceRow;

use crate::errors::SourceStoreError;

/// A trait that defines the interface for reading the source store.
///
/// Implementors are never asked to mutate the source. Rows are returned in
/// physical insertion order.
#[async_trait::async_trait]
pub trait SourceStore: Send + Sync {
    /// Lists the names of the tables that exist in the source.
    async fn list_tables(&self) -> Result<BTreeSet<String>, SourceStoreError>;

    /// Reads every row of `table`.
    ///
    /// The whole row set is pulled into memory; there is no cursor across calls.
    async fn fetch_all(&self, table: &str) -> Result<Vec<SourceRow>, SourceStoreError>;

    /// Counts the rows of `table`.
    async fn count(&self, table: &str) -> Result<i64, SourceStoreError>;

    /// Returns the first row of `table` by physical insertion order.
    async fn first_row(&self, table: &str) -> Result<Option<SourceRow>, SourceStoreError>;
}

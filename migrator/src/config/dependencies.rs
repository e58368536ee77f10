use migrator_pipeline::schema::load_schema;
use migrator_repository::{PostgresTargetStore, SqliteSourceStore};
use migrator_shared::types::SchemaMap;
use tracing::info;

use crate::config::MigratorConfig;
use crate::errors::MigratorError;

/// `Dependencies` holds what both binaries need before doing any work: the
/// parsed schema and open connections to both stores.
pub struct Dependencies {
    pub models: SchemaMap,
    pub source: SqliteSourceStore,
    pub target: PostgresTargetStore,
}

impl Dependencies {
    /// Loads the schema descriptor and opens both stores.
    ///
    /// The schema is read first so a missing descriptor fails before any
    /// connection is attempted.
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - Schema parsed and both stores reachable
    /// * `Err(MigratorError)` - Any precondition failed; the run must abort
    pub async fn new(config: &MigratorConfig) -> Result<Self, MigratorError> {
        info!(
            schema_path = %config.schema_path.display(),
            source_url = %config.source_url,
            target_url = %config.redacted_target_url(),
            "Initializing dependencies"
        );

        let models = load_schema(&config.schema_path)?;

        let source = SqliteSourceStore::connect(&config.source_url).await?;
        info!("Source store opened");

        let target = PostgresTargetStore::connect(&config.target_url).await?;
        info!("Target store connected");

        Ok(Self {
            models,
            source,
            target,
        })
    }
}

//! Migration executor.
//!
//! Copies every model's rows from the source store into the target store in
//! dependency order, counting per-row outcomes instead of aborting on them.
mod strategy;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use migrator_repository::{InsertOutcome, SourceStore, TargetStore};
use migrator_shared::types::{
    FieldDescriptor, MigrationResult, MigrationSummary, ModelDescriptor, RawValue, SourceRow,
    TypedValue,
};
use tracing::{debug, error, info, instrument, warn};

use crate::convert::convert_checked;
use crate::errors::ExecutorError;
use crate::resolver::DependencyGraph;

pub use strategy::InsertionStrategy;

/// Rows per progress batch when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Coordinates a full migration run over a resolved dependency graph.
pub struct MigrationExecutor {
    graph: DependencyGraph,
    batch_size: usize,
}

impl MigrationExecutor {
    /// Creates an executor. A zero `batch_size` is treated as one.
    pub fn new(graph: DependencyGraph, batch_size: usize) -> Self {
        Self {
            graph,
            batch_size: batch_size.max(1),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Executes the full migration.
    ///
    /// Source read failures and failures to talk to the target outside of
    /// row inserts abort the run. When integrity enforcement was disabled it
    /// is re-enabled before returning, whether or not the run succeeded.
    #[instrument(skip_all, fields(models = self.graph.len(), batch_size = self.batch_size))]
    pub async fn execute(
        &self,
        source: &dyn SourceStore,
        target: &mut dyn TargetStore,
    ) -> Result<MigrationSummary, ExecutorError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let strategy = InsertionStrategy::resolve(target).await?;
        info!(strategy = %strategy, "Resolved insertion strategy");

        let outcome = self.run(source, target, strategy).await;

        if strategy == InsertionStrategy::DisabledConstraints {
            match target.set_integrity_enforcement(true).await {
                Ok(true) => debug!("Integrity enforcement restored"),
                Ok(false) => warn!("Target refused to restore integrity enforcement"),
                Err(e) => error!(error = %e, "Failed to restore integrity enforcement"),
            }
        }

        let results = outcome?;

        let sequences_reset = match target.reset_sequences().await {
            Ok(sequences) => sequences,
            Err(e) => {
                warn!(error = %e, "Sequence reset failed; continuing");
                Vec::new()
            }
        };

        let summary = MigrationSummary::new(
            started_at,
            Utc::now(),
            strategy.as_str(),
            results,
            sequences_reset,
        );

        info!(
            elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
            source_rows = summary.totals.source_rows,
            inserted = summary.totals.inserted,
            conflict_skipped = summary.totals.conflict_skipped,
            errors = summary.totals.errors,
            coerced = summary.totals.coerced,
            sequences_reset = summary.sequences_reset.len(),
            "Migration complete"
        );

        Ok(summary)
    }

    async fn run(
        &self,
        source: &dyn SourceStore,
        target: &mut dyn TargetStore,
        strategy: InsertionStrategy,
    ) -> Result<Vec<MigrationResult>, ExecutorError> {
        let source_tables = source.list_tables().await?;

        let mut preclear_failures = match strategy {
            InsertionStrategy::OrderedWithPreclear => self.preclear(&source_tables, target).await?,
            InsertionStrategy::DisabledConstraints => HashMap::new(),
        };

        let mut results = Vec::with_capacity(self.graph.len());
        for model in self.graph.ordered_models() {
            let mut result = MigrationResult::new(&model.name, &model.table);
            if let Some(message) = preclear_failures.remove(&model.name) {
                result.record_error(message);
            }

            if !source_tables.contains(&model.table) {
                info!(model = %model.name, table = %model.table, "Table not present in source, skipping");
                result.skip("table not present in source");
                results.push(result);
                continue;
            }

            let rows = source.fetch_all(&model.table).await?;
            let result = self.migrate_model(model, rows, result, target).await;
            results.push(result);
        }

        Ok(results)
    }

    /// Truncates the target table of every model that will be migrated,
    /// dependents first. Models absent from the source keep their target rows.
    ///
    /// Returns the truncate failures keyed by model name; they are soft.
    async fn preclear(
        &self,
        source_tables: &BTreeSet<String>,
        target: &mut dyn TargetStore,
    ) -> Result<HashMap<String, String>, ExecutorError> {
        let target_tables = target.list_tables().await?;
        let mut failures = HashMap::new();

        for name in self.graph.reverse_order() {
            let Some(model) = self.graph.model(name) else {
                continue;
            };
            if !source_tables.contains(&model.table) || !target_tables.contains(&model.table) {
                continue;
            }

            match target.truncate_cascade(&model.table).await {
                Ok(()) => debug!(model = %model.name, table = %model.table, "Pre-cleared target table"),
                Err(e) => {
                    warn!(model = %model.name, table = %model.table, error = %e, "Pre-clear failed");
                    failures.insert(model.name.clone(), format!("pre-clear failed: {e}"));
                }
            }
        }

        Ok(failures)
    }

    #[instrument(skip_all, fields(model = %model.name, table = %model.table))]
    async fn migrate_model(
        &self,
        model: &ModelDescriptor,
        rows: Vec<SourceRow>,
        mut result: MigrationResult,
        target: &mut dyn TargetStore,
    ) -> MigrationResult {
        result.source_row_count = rows.len() as u64;
        if rows.is_empty() {
            info!("No rows to migrate");
            return result;
        }

        let fields = migrated_fields(model, &rows[0]);
        if fields.is_empty() {
            warn!("No declared field matches a source column, skipping");
            result.skip("no declared field matches a source column");
            return result;
        }
        let columns: Vec<String> = fields.iter().map(|f| f.column.clone()).collect();

        let batch_count = rows.len().div_ceil(self.batch_size);
        for (index, batch) in rows.chunks(self.batch_size).enumerate() {
            for row in batch {
                let values = self.convert_row(&fields, row, &mut result);
                match target.insert_row(&model.table, &columns, &values).await {
                    Ok(InsertOutcome::Inserted) => result.inserted_count += 1,
                    Ok(InsertOutcome::Conflict) => result.conflict_skipped_count += 1,
                    Err(e) => {
                        debug!(error = %e, "Row insert failed");
                        result.record_error(e.to_string());
                    }
                }
            }
            debug!(
                batch = index + 1,
                batches = batch_count,
                processed = (index * self.batch_size + batch.len()),
                "Batch processed"
            );
        }

        info!(
            source_rows = result.source_row_count,
            inserted = result.inserted_count,
            conflict_skipped = result.conflict_skipped_count,
            errors = result.error_count,
            coerced = result.coerced_count,
            "Model migrated"
        );

        result
    }

    fn convert_row(
        &self,
        fields: &[&FieldDescriptor],
        row: &SourceRow,
        result: &mut MigrationResult,
    ) -> Vec<TypedValue> {
        fields
            .iter()
            .map(|field| {
                let raw = row.get(&field.column).unwrap_or(&RawValue::Null);
                let conversion = convert_checked(raw, field.field_type);
                if conversion.lossy {
                    result.coerced_count += 1;
                }
                TypedValue::new(field.field_type, conversion.value)
            })
            .collect()
    }
}

/// Declared fields that the source actually has, in declaration order.
pub(crate) fn migrated_fields<'a>(model: &'a ModelDescriptor, sample: &SourceRow) -> Vec<&'a FieldDescriptor> {
    let observed: HashSet<&str> = sample.column_names().collect();
    model
        .fields
        .iter()
        .filter(|f| observed.contains(f.column.as_str()))
        .collect()
}

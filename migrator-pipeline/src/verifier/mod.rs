//! Verification engine.
//!
//! Reconciles the target against the source after a migration with five
//! independent checks. Check failures are recorded in the report; only store
//! access failures abort the run.
mod compare;
mod config;

use std::collections::BTreeSet;

use migrator_repository::{SourceStore, TargetStore};
use migrator_shared::types::{
    CountMismatch, FieldDescriptor, FieldType, ModelDescriptor, SchemaMap, SourceRow,
    VerificationReport,
};
use regex::RegexSet;
use tracing::{debug, info, instrument};

use crate::convert::{convert, parse_instant};
use crate::errors::VerifierError;
use crate::executor::migrated_fields;

pub use compare::{canonical_text, compare_field};
pub use config::{VerifierConfig, DEFAULT_JSON_FIELD_PATTERNS, DEFAULT_SAMPLE_LIMIT};

/// Runs the reconciliation checks for every model found in the source.
pub struct VerificationEngine {
    models: SchemaMap,
    json_fields: RegexSet,
    sample_limit: i64,
    max_mismatches: usize,
}

impl VerificationEngine {
    /// Creates an engine, compiling the structured-text field patterns.
    pub fn new(models: SchemaMap, config: VerifierConfig) -> Result<Self, VerifierError> {
        let json_fields = RegexSet::new(&config.json_field_patterns)?;
        Ok(Self {
            models,
            json_fields,
            sample_limit: config.sample_limit,
            max_mismatches: config.max_mismatches,
        })
    }

    /// True when text values of `field` must hold JSON.
    pub fn is_structured_text(&self, field: &FieldDescriptor) -> bool {
        field.field_type == FieldType::Text && self.json_fields.is_match(&field.name)
    }

    #[instrument(skip_all, fields(models = self.models.len()))]
    pub async fn verify(
        &self,
        source: &dyn SourceStore,
        target: &mut dyn TargetStore,
    ) -> Result<VerificationReport, VerifierError> {
        let mut report = VerificationReport::new(self.max_mismatches);
        let source_tables = source.list_tables().await?;
        let target_tables = target.list_tables().await?;

        for model in self.models.values() {
            if !source_tables.contains(&model.table) {
                debug!(model = %model.name, "Table not present in source, not verified");
                continue;
            }
            self.verify_model(model, &target_tables, source, target, &mut report)
                .await?;
        }

        info!(
            count_failures = report.counts.failed,
            sample_failures = report.samples.failed,
            boolean_failures = report.booleans.failed,
            timestamp_failures = report.timestamps.failed,
            structured_text_failures = report.structured_text.failed,
            "Verification complete"
        );

        Ok(report)
    }

    #[instrument(skip_all, fields(model = %model.name, table = %model.table))]
    async fn verify_model(
        &self,
        model: &ModelDescriptor,
        target_tables: &BTreeSet<String>,
        source: &dyn SourceStore,
        target: &mut dyn TargetStore,
        report: &mut VerificationReport,
    ) -> Result<(), VerifierError> {
        if !target_tables.contains(&model.table) {
            info!("Table missing in target, skipping checks");
            report.counts.skip();
            report.samples.skip();
            return Ok(());
        }

        let source_count = source.count(&model.table).await?;
        let target_count = target.count(&model.table).await?;
        if source_count == target_count {
            report.counts.pass();
        } else {
            info!(source_count, target_count, "Row counts differ");
            report
                .counts
                .fail(CountMismatch::new(&model.table, source_count, target_count));
        }

        let Some(first_row) = source.first_row(&model.table).await? else {
            report.samples.skip();
            return Ok(());
        };
        let fields = migrated_fields(model, &first_row);

        self.check_sample(model, &fields, &first_row, target, report)
            .await?;

        for field in &fields {
            match field.field_type {
                FieldType::Boolean => self.check_booleans(model, field, target, report).await?,
                FieldType::Timestamp => self.check_timestamps(model, field, target, report).await?,
                FieldType::Text if self.is_structured_text(field) => {
                    self.check_structured_text(model, field, target, report)
                        .await?
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Compares the source's first row with the target row of the same identity.
    async fn check_sample(
        &self,
        model: &ModelDescriptor,
        fields: &[&FieldDescriptor],
        source_row: &SourceRow,
        target: &mut dyn TargetStore,
        report: &mut VerificationReport,
    ) -> Result<(), VerifierError> {
        let Some(identity) = model.identity_field() else {
            report.samples.skip();
            return Ok(());
        };
        if fields.is_empty() {
            report.samples.skip();
            return Ok(());
        }
        let id_raw = source_row.get(&identity.column);
        let Some(id_value) = id_raw.and_then(|raw| convert(raw, identity.field_type)) else {
            report.samples.skip();
            return Ok(());
        };
        let id_text = canonical_text(&id_value);

        let columns: Vec<String> = fields.iter().map(|f| f.column.clone()).collect();
        let Some(target_row) = target
            .fetch_text_row(&model.table, &identity.column, &id_text, &columns)
            .await?
        else {
            report
                .samples
                .fail(format!("{}: row {} missing in target", model.name, id_text));
            return Ok(());
        };

        let diagnostics: Vec<String> = fields
            .iter()
            .filter_map(|field| {
                let raw = source_row.get(&field.column)?;
                let stored = target_row.get(&field.column).and_then(|v| v.as_deref());
                compare_field(raw, field.field_type, stored)
                    .map(|diagnostic| format!("{}: {}", field.name, diagnostic))
            })
            .collect();

        if diagnostics.is_empty() {
            report.samples.pass();
        } else {
            report.samples.fail(format!(
                "{} row {}: {}",
                model.name,
                id_text,
                diagnostics.join("; ")
            ));
        }
        Ok(())
    }

    async fn check_booleans(
        &self,
        model: &ModelDescriptor,
        field: &FieldDescriptor,
        target: &mut dyn TargetStore,
        report: &mut VerificationReport,
    ) -> Result<(), VerifierError> {
        let values = target
            .distinct_text_values(&model.table, &field.column, self.sample_limit)
            .await?;
        let invalid: Vec<&String> = values
            .iter()
            .filter(|v| v.as_str() != "true" && v.as_str() != "false")
            .collect();

        if invalid.is_empty() {
            report.booleans.pass();
        } else {
            report
                .booleans
                .fail(format!("{}.{}: invalid values {:?}", model.name, field.name, invalid));
        }
        Ok(())
    }

    async fn check_timestamps(
        &self,
        model: &ModelDescriptor,
        field: &FieldDescriptor,
        target: &mut dyn TargetStore,
        report: &mut VerificationReport,
    ) -> Result<(), VerifierError> {
        let values = target
            .distinct_text_values(&model.table, &field.column, self.sample_limit)
            .await?;
        if values.is_empty() {
            report.timestamps.skip();
            return Ok(());
        }

        let invalid: Vec<&String> = values.iter().filter(|v| parse_instant(v).is_none()).collect();
        if invalid.is_empty() {
            report.timestamps.pass();
        } else {
            report
                .timestamps
                .fail(format!("{}.{}: invalid values {:?}", model.name, field.name, invalid));
        }
        Ok(())
    }

    async fn check_structured_text(
        &self,
        model: &ModelDescriptor,
        field: &FieldDescriptor,
        target: &mut dyn TargetStore,
        report: &mut VerificationReport,
    ) -> Result<(), VerifierError> {
        let values = target
            .distinct_text_values(&model.table, &field.column, self.sample_limit)
            .await?;
        let present: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
        if present.is_empty() {
            report.structured_text.skip();
            return Ok(());
        }

        let invalid = present
            .iter()
            .filter(|v| serde_json::from_str::<serde_json::Value>(v).is_err())
            .count();
        if invalid == 0 {
            report.structured_text.pass();
        } else {
            report.structured_text.fail(format!(
                "{}.{}: {} of {} values are not valid JSON",
                model.name,
                field.name,
                invalid,
                present.len()
            ));
        }
        Ok(())
    }
}

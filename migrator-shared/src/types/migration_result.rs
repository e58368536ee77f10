use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of representative error messages kept per model.
pub const MAX_SAMPLE_ERRORS: usize = 3;

/// Outcome of migrating a single model.
///
/// Produced once per model per run. A conflict (row already present in the
/// target) is counted separately from errors and never fails the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub model: String,
    pub table: String,
    pub source_row_count: u64,
    pub inserted_count: u64,
    pub conflict_skipped_count: u64,
    pub error_count: u64,
    /// Non-null source values that could only be converted lossily.
    pub coerced_count: u64,
    pub sample_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl MigrationResult {
    pub fn new(model: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            table: table.into(),
            ..Default::default()
        }
    }

    /// Marks the model as not migrated, keeping any counts already recorded.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.skipped = Some(reason.into());
    }

    /// Counts an error, keeping the message only while fewer than
    /// [`MAX_SAMPLE_ERRORS`] have been sampled.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        if self.sample_errors.len() < MAX_SAMPLE_ERRORS {
            self.sample_errors.push(message.into());
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationTotals {
    pub source_rows: u64,
    pub inserted: u64,
    pub conflict_skipped: u64,
    pub errors: u64,
    pub coerced: u64,
}

/// Run-level aggregate written as the migration report artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub strategy: String,
    pub results: Vec<MigrationResult>,
    pub totals: MigrationTotals,
    pub sequences_reset: Vec<String>,
}

impl MigrationSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        strategy: impl Into<String>,
        results: Vec<MigrationResult>,
        sequences_reset: Vec<String>,
    ) -> Self {
        let totals = results.iter().fold(MigrationTotals::default(), |mut acc, r| {
            acc.source_rows += r.source_row_count;
            acc.inserted += r.inserted_count;
            acc.conflict_skipped += r.conflict_skipped_count;
            acc.errors += r.error_count;
            acc.coerced += r.coerced_count;
            acc
        });
        let elapsed_seconds =
            (finished_at - started_at).num_milliseconds().max(0) as f64 / 1000.0;

        Self {
            started_at,
            finished_at,
            elapsed_seconds,
            strategy: strategy.into(),
            results,
            totals,
            sequences_reset,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.totals.errors > 0
    }

    pub fn result_for(&self, model: &str) -> Option<&MigrationResult> {
        self.results.iter().find(|r| r.model == model)
    }
}

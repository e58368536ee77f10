use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on literal mismatch descriptions kept per check.
pub const DEFAULT_MAX_MISMATCHES: usize = 20;

/// A record-count disagreement between the two stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountMismatch {
    pub table: String,
    pub sqlite_count: i64,
    pub pg_count: i64,
    /// `pg_count - sqlite_count`; negative when rows were lost.
    pub diff: i64,
}

impl CountMismatch {
    pub fn new(table: impl Into<String>, sqlite_count: i64, pg_count: i64) -> Self {
        Self {
            table: table.into(),
            sqlite_count,
            pg_count,
            diff: pg_count - sqlite_count,
        }
    }
}

/// Pass/fail accounting for one class of reconciliation check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport<T = String> {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub mismatches: Vec<T>,
    #[serde(skip)]
    max_mismatches: usize,
}

impl<T> CheckReport<T> {
    pub fn new(max_mismatches: usize) -> Self {
        Self {
            passed: 0,
            failed: 0,
            skipped: 0,
            mismatches: Vec::new(),
            max_mismatches,
        }
    }

    pub fn pass(&mut self) {
        self.passed += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Counts a failure and keeps its description while under the cap.
    pub fn fail(&mut self, mismatch: T) {
        self.failed += 1;
        if self.mismatches.len() < self.max_mismatches {
            self.mismatches.push(mismatch);
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl<T> Default for CheckReport<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MISMATCHES)
    }
}

/// The five independent reconciliation checks of a verification run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub generated_at: DateTime<Utc>,
    pub counts: CheckReport<CountMismatch>,
    pub samples: CheckReport,
    pub booleans: CheckReport,
    pub timestamps: CheckReport,
    pub structured_text: CheckReport,
}

impl VerificationReport {
    pub fn new(max_mismatches: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            counts: CheckReport::new(max_mismatches),
            samples: CheckReport::new(max_mismatches),
            booleans: CheckReport::new(max_mismatches),
            timestamps: CheckReport::new(max_mismatches),
            structured_text: CheckReport::new(max_mismatches),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.counts.has_failures()
            || self.samples.has_failures()
            || self.booleans.has_failures()
            || self.timestamps.has_failures()
            || self.structured_text.has_failures()
    }

    pub fn total_failures(&self) -> u64 {
        self.counts.failed
            + self.samples.failed
            + self.booleans.failed
            + self.timestamps.failed
            + self.structured_text.failed
    }
}

//! Report artifacts written at the end of a run.
use std::path::{Path, PathBuf};

use migrator_shared::types::{MigrationResult, VerificationReport};
use serde::Serialize;

use crate::errors::MigratorError;

pub const MIGRATION_REPORT_FILE: &str = "migration-report.json";
pub const VERIFICATION_REPORT_FILE: &str = "verification-report.json";

/// Serializes `report` as pretty JSON into `dir/file_name`, creating `dir`
/// when needed. Returns the written path.
pub async fn write_report<T: Serialize>(
    dir: &Path,
    file_name: &str,
    report: &T,
) -> Result<PathBuf, MigratorError> {
    let path = dir.join(file_name);
    let body = serde_json::to_vec_pretty(report)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| MigratorError::Report {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| MigratorError::Report {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

/// One-line human summary of a model's migration.
pub fn result_line(result: &MigrationResult) -> String {
    if let Some(reason) = &result.skipped {
        return format!("{:<24} skipped ({reason})", result.model);
    }

    let mut line = format!(
        "{:<24} {:>7} rows  {:>7} inserted  {:>7} conflicts  {:>5} errors",
        result.model,
        result.source_row_count,
        result.inserted_count,
        result.conflict_skipped_count,
        result.error_count
    );
    if result.coerced_count > 0 {
        line.push_str(&format!("  {} coerced", result.coerced_count));
    }
    line
}

/// One-line human summary per verification check.
pub fn check_lines(report: &VerificationReport) -> Vec<String> {
    let line = |name: &str, passed: u64, failed: u64, skipped: u64| {
        format!("{name:<16} {passed:>5} passed  {failed:>5} failed  {skipped:>5} skipped")
    };

    vec![
        line("counts", report.counts.passed, report.counts.failed, report.counts.skipped),
        line("samples", report.samples.passed, report.samples.failed, report.samples.skipped),
        line("booleans", report.booleans.passed, report.booleans.failed, report.booleans.skipped),
        line(
            "timestamps",
            report.timestamps.passed,
            report.timestamps.failed,
            report.timestamps.skipped,
        ),
        line(
            "structured text",
            report.structured_text.passed,
            report.structured_text.failed,
            report.structured_text.skipped,
        ),
    ]
}

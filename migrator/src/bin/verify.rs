//! Verify Entry Point
//!
//! Reconciles the target store against the source store after a migration
//! and writes `verification-report.json`. Exits non-zero when any check failed.

use std::process::ExitCode;

use dotenv::dotenv;
use migrator::report::{VERIFICATION_REPORT_FILE, check_lines, write_report};
use migrator::telemetry::{LogFormat, init_tracing};
use migrator::{Dependencies, MigratorConfig, MigratorError};
use migrator_pipeline::VerificationEngine;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode, MigratorError> {
    dotenv().ok();
    init_tracing("verify", LogFormat::from_env());

    match run().await {
        Ok(code) => Ok(code),
        Err(e) => {
            error!(error = %e, "Verification aborted");
            Err(e)
        }
    }
}

async fn run() -> Result<ExitCode, MigratorError> {
    let config = MigratorConfig::from_env()?;
    let Dependencies {
        models,
        source,
        mut target,
    } = Dependencies::new(&config).await?;

    let engine = VerificationEngine::new(models, config.verifier.clone())?;
    let report = engine.verify(&source, &mut target).await?;

    if let Err(e) = target.close().await {
        warn!(error = %e, "Failed to close target connection cleanly");
    }

    for line in check_lines(&report) {
        info!("{line}");
    }
    for mismatch in &report.counts.mismatches {
        warn!(
            table = %mismatch.table,
            sqlite_count = mismatch.sqlite_count,
            pg_count = mismatch.pg_count,
            diff = mismatch.diff,
            "Row count mismatch"
        );
    }
    for mismatch in report
        .samples
        .mismatches
        .iter()
        .chain(&report.booleans.mismatches)
        .chain(&report.timestamps.mismatches)
        .chain(&report.structured_text.mismatches)
    {
        warn!("{mismatch}");
    }

    let path = write_report(&config.report_dir, VERIFICATION_REPORT_FILE, &report).await?;
    info!(
        path = %path.display(),
        failures = report.total_failures(),
        "Verification report written"
    );

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

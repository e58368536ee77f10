//! Migrate Entry Point
//!
//! Copies every model of the source store into the target store in
//! dependency order and writes `migration-report.json`. Exits non-zero when
//! any row failed to migrate.

use std::process::ExitCode;

use dotenv::dotenv;
use migrator::report::{MIGRATION_REPORT_FILE, result_line, write_report};
use migrator::telemetry::{LogFormat, init_tracing};
use migrator::{Dependencies, MigratorConfig, MigratorError};
use migrator_pipeline::{DependencyGraph, MigrationExecutor};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode, MigratorError> {
    dotenv().ok();
    init_tracing("migrate", LogFormat::from_env());

    match run().await {
        Ok(code) => Ok(code),
        Err(e) => {
            error!(error = %e, "Migration aborted");
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

    let graph = DependencyGraph::build(models);
    info!(order = ?graph.order(), "Resolved model order");

    let executor = MigrationExecutor::new(graph, config.batch_size);
    let summary = executor.execute(&source, &mut target).await?;

    if let Err(e) = target.close().await {
        warn!(error = %e, "Failed to close target connection cleanly");
    }

    for result in &summary.results {
        info!("{}", result_line(result));
    }

    let path = write_report(&config.report_dir, MIGRATION_REPORT_FILE, &summary).await?;
    info!(
        path = %path.display(),
        inserted = summary.totals.inserted,
        conflict_skipped = summary.totals.conflict_skipped,
        errors = summary.totals.errors,
        elapsed_seconds = summary.elapsed_seconds,
        "Migration report written"
    );

    if summary.has_errors() {
        warn!(errors = summary.totals.errors, "Migration finished with row errors");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

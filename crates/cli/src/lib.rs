//! `orderscope` library crate.
//!
//! Holds the run logic so it can be driven from integration tests. The
//! binary entrypoint lives in `main.rs`.

use std::error::Error;
use std::io::Write;

use anyhow::Context;
use orderscope_core::masking::mask_database_url;
use orderscope_core::report::render_error;
use orderscope_db::{DbConnection, InspectOptions};

pub mod config;

pub use config::Config;

/// Connect, inspect the configured order, disconnect and print the report.
pub async fn run<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    tracing::info!(
        url = %mask_database_url(&config.database_url),
        timeout_secs = config.connect_timeout.as_secs(),
        "Connecting to the database",
    );
    let mut conn = orderscope_db::connect(&config.database_url, config.connect_timeout)
        .await
        .context("Failed to connect to the database")?;

    let health = orderscope_db::health_check(&mut conn).await;
    if let Err(e) = health {
        orderscope_db::close(conn).await;
        return Err(e).context("Database health check failed");
    }
    tracing::info!("Database connection successful");

    let options = InspectOptions {
        identifier: config.order_id.clone(),
        orders_table: config.orders_table.clone(),
    };
    let result = inspect(&mut conn, &options, out).await;

    orderscope_db::close(conn).await;
    tracing::info!("Database connection closed");
    result
}

/// Inspect over an open connection and print what was gathered.
///
/// The report is written even when a step fails, so everything found before
/// the failure reaches the output ahead of the error.
pub async fn inspect<W: Write>(
    conn: &mut DbConnection,
    options: &InspectOptions,
    out: &mut W,
) -> anyhow::Result<()> {
    let inspection = orderscope_db::inspect_order(conn, options).await;
    let report = &inspection.report;

    report.render(out).context("Failed to write report")?;

    let failed = report.failed_sections().count();
    if failed > 0 {
        tracing::warn!(failed, "Some related tables could not be read");
    }

    match inspection.error {
        Some(e) => {
            Err(e).with_context(|| format!("Failed to inspect order {}", options.identifier))
        }
        None => {
            tracing::info!(found = report.is_found(), "Inspection finished");
            Ok(())
        }
    }
}

/// Run to completion, printing any failure instead of returning it.
///
/// Returns whether the run succeeded. Callers still exit with status 0.
pub async fn run_and_report<W: Write>(config: &Config, out: &mut W) -> bool {
    match run(config, out).await {
        Ok(()) => true,
        Err(err) => {
            report_failure(&err, out);
            false
        }
    }
}

/// Log the failure with its full chain and print the error block.
pub fn report_failure<W: Write>(err: &anyhow::Error, out: &mut W) {
    tracing::error!(error = ?err, "Order inspection failed");

    let cause: &(dyn Error + 'static) = err.as_ref();
    if let Err(e) = render_error(cause, out) {
        tracing::error!(error = %e, "Failed to write error report");
    }
}

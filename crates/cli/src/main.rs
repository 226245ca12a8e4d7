//! `orderscope` -- print one order and its related rows from a Postgres
//! database whose schema is discovered at runtime.
//!
//! # Usage
//!
//! ```bash
//! orderscope [ORDER_ID]
//! ```
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default       | Description                          |
//! |---------------------------|----------|---------------|--------------------------------------|
//! | `DATABASE_URL`            | yes      | --            | Postgres connection string           |
//! | `ORDER_ID`                | no       | `VP-90b713fd` | Order to inspect (argument wins)     |
//! | `ORDERS_TABLE`            | no       | heuristic     | Explicit orders table name           |
//! | `DB_CONNECT_TIMEOUT_SECS` | no       | `10`          | Connection timeout in seconds        |
//!
//! Failures are printed and logged; the exit status is always 0.

use orderscope::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderscope=info,orderscope_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut out = std::io::stdout();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            orderscope::report_failure(&anyhow::Error::from(e), &mut out);
            return;
        }
    };

    tracing::info!(order_id = %config.order_id, "Starting orderscope");

    if orderscope::run_and_report(&config, &mut out).await {
        tracing::info!("Inspection complete");
    }
}

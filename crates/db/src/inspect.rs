//! End-to-end inspection of one order identifier.

use orderscope_core::discovery::{
    lookup_key_columns, order_reference_column, order_related_tables, related_tables,
    select_orders_table,
};
use orderscope_core::record::{related_match_value, Record};
use orderscope_core::report::{LookupOutcome, OrderReport, RelatedSection};
use sqlx::postgres::PgConnection;

use crate::catalog::CatalogRepo;
use crate::lookup::OrderRepo;
use crate::DbError;

/// What to look up and where.
#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub identifier: String,
    /// Explicit orders table; the name heuristic is used when `None`.
    pub orders_table: Option<String>,
}

/// Result of an inspection: whatever was gathered, plus the error that
/// stopped it early, if any.
#[derive(Debug)]
pub struct Inspection {
    pub report: OrderReport,
    pub error: Option<DbError>,
}

impl Inspection {
    /// The report if the run completed, otherwise the error.
    pub fn into_result(self) -> Result<OrderReport, DbError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.report),
        }
    }
}

/// Discover the orders table, fetch the order and sweep related tables.
///
/// The related sweep only runs when the order exists. A related table that
/// cannot be read is recorded in its section and the sweep continues; any
/// other failure stops the run with the report filled up to that step.
pub async fn inspect_order(conn: &mut PgConnection, options: &InspectOptions) -> Inspection {
    let mut report = OrderReport::new(options.identifier.as_str());
    let error = collect(conn, options, &mut report).await.err();

    if let Some(e) = &error {
        tracing::error!(error = %e, identifier = %options.identifier, "Inspection stopped early");
    }
    Inspection { report, error }
}

async fn collect(
    conn: &mut PgConnection,
    options: &InspectOptions,
    report: &mut OrderReport,
) -> Result<(), DbError> {
    let identifier = options.identifier.as_str();

    let tables = CatalogRepo::list_tables(conn).await?;
    tracing::info!(count = tables.len(), "Fetched public tables");

    report.order_tables = order_related_tables(&tables)
        .into_iter()
        .map(str::to_string)
        .collect();
    let selected = select_orders_table(&tables, options.orders_table.as_deref())
        .map(str::to_string);
    report.tables = Some(tables);
    let orders_table = selected?;
    tracing::info!(
        table = %orders_table,
        candidates = report.order_tables.len(),
        "Using orders table",
    );
    report.orders_table = Some(orders_table.clone());

    let columns = CatalogRepo::list_columns(conn, &orders_table).await?;
    let keys = lookup_key_columns(&orders_table, columns.iter().map(|c| c.name.as_str()));
    report.columns = Some(columns);
    let keys = keys?;
    let columns = report.columns.as_deref().unwrap_or_default();

    tracing::info!(identifier, keys = ?keys, "Searching for order");
    let order = OrderRepo::find_order(conn, &orders_table, columns, &keys, identifier).await?;

    let outcome = match order {
        None => {
            tracing::warn!(identifier, "Order not found");
            LookupOutcome::NotFound
        }
        Some(order) => {
            let tables = report.tables.as_deref().unwrap_or_default();
            let related = sweep_related(conn, tables, &order, identifier).await;
            LookupOutcome::Found { order, related }
        }
    };
    report.outcome = Some(outcome);

    Ok(())
}

async fn sweep_related(
    conn: &mut PgConnection,
    tables: &[String],
    order: &Record,
    identifier: &str,
) -> Vec<RelatedSection> {
    let value = related_match_value(order, identifier);
    let mut sections = Vec::new();

    for table in related_tables(tables) {
        let section = match check_related(conn, table, value).await {
            Ok(section) => section,
            Err(e) => {
                tracing::error!(table, error = %e, "Failed to read related table");
                RelatedSection {
                    table: table.to_string(),
                    reference_column: None,
                    records: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        sections.push(section);
    }

    sections
}

async fn check_related(
    conn: &mut PgConnection,
    table: &str,
    value: &str,
) -> Result<RelatedSection, sqlx::Error> {
    let columns = CatalogRepo::list_columns(conn, table).await?;
    let Some(reference) = order_reference_column(columns.iter().map(|c| c.name.as_str())) else {
        tracing::debug!(table, "No order reference column, skipping");
        return Ok(RelatedSection {
            table: table.to_string(),
            reference_column: None,
            records: Vec::new(),
            error: None,
        });
    };

    let records = OrderRepo::find_related(conn, table, &columns, reference, value).await?;
    tracing::info!(table, column = reference, count = records.len(), "Checked related table");

    Ok(RelatedSection {
        table: table.to_string(),
        reference_column: Some(reference.to_string()),
        records,
        error: None,
    })
}

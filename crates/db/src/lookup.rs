//! Order and related-row queries over tables discovered at runtime.
//!
//! Table and column names are quoted identifiers, values are always bound
//! parameters. Every column is selected as `::text` so rows of any shape
//! decode into a [`Record`] without knowing their types up front.

use orderscope_core::discovery::{
    quote_ident, text_equals_predicate, text_select_list, CREATED_AT_COLUMN,
};
use orderscope_core::record::{ColumnInfo, Record};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Row};

/// Looks up rows in the orders table and its auxiliary tables.
pub struct OrderRepo;

impl OrderRepo {
    /// First row of `table` whose key columns equal `identifier` as text.
    pub async fn find_order(
        conn: &mut PgConnection,
        table: &str,
        columns: &[ColumnInfo],
        key_columns: &[&str],
        identifier: &str,
    ) -> Result<Option<Record>, sqlx::Error> {
        let query = order_lookup_sql(table, columns, key_columns);
        let row = sqlx::query(&query)
            .bind(identifier)
            .fetch_optional(conn)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// All rows of `table` whose `reference_column` equals `value` as text.
    pub async fn find_related(
        conn: &mut PgConnection,
        table: &str,
        columns: &[ColumnInfo],
        reference_column: &str,
        value: &str,
    ) -> Result<Vec<Record>, sqlx::Error> {
        let query = related_lookup_sql(table, columns, reference_column);
        let rows = sqlx::query(&query).bind(value).fetch_all(conn).await?;

        rows.iter().map(row_to_record).collect()
    }
}

/// `SELECT <cols> FROM "<table>" WHERE <keys> LIMIT 1`, keyed on `$1`.
pub fn order_lookup_sql(table: &str, columns: &[ColumnInfo], key_columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} LIMIT 1",
        text_select_list(columns.iter().map(|c| c.name.as_str())),
        quote_ident(table),
        text_equals_predicate(key_columns, 1),
    )
}

/// Related-row query, newest first when the table has `created_at`.
pub fn related_lookup_sql(table: &str, columns: &[ColumnInfo], reference_column: &str) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        text_select_list(columns.iter().map(|c| c.name.as_str())),
        quote_ident(table),
        text_equals_predicate(&[reference_column], 1),
    );
    if columns.iter().any(|c| c.name == CREATED_AT_COLUMN) {
        sql.push_str(&format!(" ORDER BY {} DESC", quote_ident(CREATED_AT_COLUMN)));
    }
    sql
}

fn row_to_record(row: &PgRow) -> Result<Record, sqlx::Error> {
    let fields = row
        .columns()
        .iter()
        .map(|col| {
            let value: Option<String> = row.try_get(col.ordinal())?;
            Ok((col.name().to_string(), value))
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(Record::new(fields))
}

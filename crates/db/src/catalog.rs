//! Schema introspection through `information_schema`.

use orderscope_core::record::ColumnInfo;
use sqlx::postgres::PgConnection;

/// Schema every lookup is confined to.
pub const SCHEMA: &str = "public";

/// Reads table and column names from the catalog.
pub struct CatalogRepo;

impl CatalogRepo {
    /// All tables in the `public` schema, sorted by name.
    pub async fn list_tables(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT table_name::text
             FROM information_schema.tables
             WHERE table_schema = $1
             ORDER BY table_name",
        )
        .bind(SCHEMA)
        .fetch_all(conn)
        .await
    }

    /// Columns of `table` in ordinal order.
    pub async fn list_columns(
        conn: &mut PgConnection,
        table: &str,
    ) -> Result<Vec<ColumnInfo>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name::text, data_type::text
             FROM information_schema.columns
             WHERE table_schema = $1 AND table_name = $2
             ORDER BY ordinal_position",
        )
        .bind(SCHEMA)
        .bind(table)
        .fetch_all(conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type)| ColumnInfo { name, data_type })
            .collect())
    }
}

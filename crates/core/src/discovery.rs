//! Name-matching heuristics used to find order data in an unknown schema.
//!
//! Everything here works on plain table and column names so it can be
//! exercised without a database.

use crate::error::CoreError;

/// Substring a table name must contain to be considered order-related.
pub const ORDER_TABLE_MARKER: &str = "order";

/// Substrings that mark a table as holding auxiliary order records.
pub const RELATED_TABLE_MARKERS: [&str; 4] =
    ["order_log", "order_history", "order_status", "order_error"];

/// Columns an order row may be looked up by, in predicate order.
pub const LOOKUP_KEY_COLUMNS: [&str; 2] = ["external_id", "id"];

/// Column whose value is used to match related rows.
pub const ORDER_ID_COLUMN: &str = "id";

/// Column used to order related rows, newest first, when present.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Tables whose lowercased name contains `order`, in input order.
pub fn order_related_tables(tables: &[String]) -> Vec<&str> {
    tables
        .iter()
        .map(String::as_str)
        .filter(|t| t.to_lowercase().contains(ORDER_TABLE_MARKER))
        .collect()
}

/// Pick the authoritative orders table.
///
/// An explicit `preferred` name wins when it exists in `tables`. Otherwise the
/// first order-related table is used, which is arbitrary when the schema has
/// several of them.
pub fn select_orders_table<'a>(
    tables: &'a [String],
    preferred: Option<&str>,
) -> Result<&'a str, CoreError> {
    if let Some(name) = preferred {
        return tables
            .iter()
            .map(String::as_str)
            .find(|t| *t == name)
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()));
    }

    order_related_tables(tables)
        .into_iter()
        .next()
        .ok_or(CoreError::NoOrdersTable)
}

/// Whether a table name matches any of [`RELATED_TABLE_MARKERS`].
pub fn is_related_table(name: &str) -> bool {
    let lower = name.to_lowercase();
    RELATED_TABLE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Tables to sweep for related records, in input order.
pub fn related_tables(tables: &[String]) -> Vec<&str> {
    tables
        .iter()
        .map(String::as_str)
        .filter(|t| is_related_table(t))
        .collect()
}

/// First column that looks like a reference to an order.
///
/// The lowercased name must contain `order` and either `id` or `external`.
pub fn order_reference_column<'a, I>(columns: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    columns.into_iter().find(|c| {
        let lower = c.to_lowercase();
        lower.contains("order") && (lower.contains("id") || lower.contains("external"))
    })
}

/// The subset of [`LOOKUP_KEY_COLUMNS`] present in `columns`.
pub fn lookup_key_columns<'a, I>(table: &str, columns: I) -> Result<Vec<&'static str>, CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = columns.into_iter().collect();
    let keys: Vec<&'static str> = LOOKUP_KEY_COLUMNS
        .iter()
        .copied()
        .filter(|k| present.contains(k))
        .collect();

    if keys.is_empty() {
        return Err(CoreError::MissingKeyColumns {
            table: table.to_string(),
        });
    }
    Ok(keys)
}

// ---------------------------------------------------------------------------
// SQL fragments
// ---------------------------------------------------------------------------

/// Quote an identifier for Postgres, doubling embedded quotes.
///
/// ```
/// use orderscope_core::discovery::quote_ident;
///
/// assert_eq!(quote_ident("Order"), "\"Order\"");
/// assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Select list that renders every column as text under its own name.
pub fn text_select_list<'a, I>(columns: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    columns
        .into_iter()
        .map(|c| {
            let q = quote_ident(c);
            format!("{q}::text AS {q}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"a"::text = $n OR "b"::text = $n` over the given columns.
pub fn text_equals_predicate(columns: &[&str], param: usize) -> String {
    columns
        .iter()
        .map(|c| format!("{}::text = ${param}", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

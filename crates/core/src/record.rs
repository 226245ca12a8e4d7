//! Untyped rows borrowed from whatever schema the database happens to have.

use std::fmt;

/// Placeholder printed for SQL `NULL`.
pub const NULL_DISPLAY: &str = "NULL";

/// A column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// One row: column names paired with their text rendering, in select order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new(fields: Vec<(String, Option<String>)>) -> Self {
        Self { fields }
    }

    /// Value of the named column; `None` if absent, `Some(None)` if NULL.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    /// `name: value` per line, without a trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name}: {}", value.unwrap_or(NULL_DISPLAY))?;
        }
        Ok(())
    }
}

/// The value related rows are matched against.
///
/// Uses the order's `id` when it has a non-NULL one, else the identifier the
/// user asked for.
pub fn related_match_value<'a>(order: &'a Record, identifier: &'a str) -> &'a str {
    order
        .get(crate::discovery::ORDER_ID_COLUMN)
        .flatten()
        .unwrap_or(identifier)
}

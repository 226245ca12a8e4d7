#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No order-related tables found in schema 'public'")]
    NoOrdersTable,

    #[error("Table '{0}' does not exist in schema 'public'")]
    UnknownTable(String),

    #[error("Table '{table}' has neither an 'external_id' nor an 'id' column")]
    MissingKeyColumns { table: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

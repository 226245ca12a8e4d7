use orderscope_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Timed out connecting to the database after {secs}s")]
    Timeout { secs: u64 },
}

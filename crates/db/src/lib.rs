use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};

pub mod catalog;
pub mod error;
pub mod inspect;
pub mod lookup;

pub use error::DbError;
pub use inspect::{inspect_order, InspectOptions, Inspection};

pub type DbConnection = sqlx::PgConnection;

/// Default time allowed for establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open a single connection from a database URL.
///
/// No pool: the inspection is one linear sequence of queries.
pub async fn connect(database_url: &str, timeout: Duration) -> Result<PgConnection, DbError> {
    let options = PgConnectOptions::from_str(database_url)?;

    match tokio::time::timeout(timeout, options.connect()).await {
        Ok(conn) => Ok(conn?),
        Err(_) => Err(DbError::Timeout {
            secs: timeout.as_secs(),
        }),
    }
}

/// Round-trip a trivial query to prove the connection is usable.
pub async fn health_check(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(conn)
        .await
        .map(|_| ())
}

/// Close the connection, logging rather than failing if the server is gone.
pub async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection cleanly");
    }
}

//! Settings read from the environment.

use std::time::Duration;

use orderscope_core::CoreError;
use orderscope_db::DEFAULT_CONNECT_TIMEOUT;

/// Order inspected when neither `ORDER_ID` nor an argument is given.
pub const DEFAULT_ORDER_ID: &str = "VP-90b713fd";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub order_id: String,
    pub orders_table: Option<String>,
    pub connect_timeout: Duration,
}

impl Config {
    /// Build from process environment and the first positional argument.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok(), std::env::args().nth(1))
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, order_arg: Option<String>) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| CoreError::Config("DATABASE_URL must be set".into()))?;

        let order_id = order_arg
            .filter(|v| !v.trim().is_empty())
            .or_else(|| var("ORDER_ID"))
            .unwrap_or_else(|| DEFAULT_ORDER_ID.to_string());

        let connect_timeout = match var("DB_CONNECT_TIMEOUT_SECS") {
            None => DEFAULT_CONNECT_TIMEOUT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    CoreError::Config(format!(
                        "DB_CONNECT_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    ))
                })?,
        };

        Ok(Self {
            database_url,
            order_id,
            orders_table: var("ORDERS_TABLE"),
            connect_timeout,
        })
    }
}

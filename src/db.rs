//! Connection bootstrap: database parameters with in-code defaults and a
//! pooled connection source with fixed tuning.

use crate::error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Baseline pool size: connections kept ready.
pub const POOL_SIZE: u32 = 5;
/// Connections allowed beyond the baseline under load.
pub const MAX_OVERFLOW: u32 = 10;
/// Seconds a request waits for a connection before failing.
pub const POOL_TIMEOUT_SECS: u64 = 10;
/// Seconds before a pooled connection is recycled.
pub const POOL_RECYCLE_SECS: u64 = 600;

/// Connection parameters. Defaults are in-code; this version is not
/// environment-driven.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            host: "127.0.0.1".into(),
            port: 5432,
            username: "postgres".into(),
            password: String::new(),
            database: "ppds".into(),
        }
    }
}

impl DbConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// Build the pooled connection source and verify connectivity. Failure here
/// is fatal to startup.
pub async fn connect(config: &DbConfig) -> Result<PgPool, AppError> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        pool_size = POOL_SIZE,
        max_overflow = MAX_OVERFLOW,
        "connecting to database"
    );
    let pool = PgPoolOptions::new()
        .max_connections(POOL_SIZE + MAX_OVERFLOW)
        .min_connections(POOL_SIZE)
        .acquire_timeout(Duration::from_secs(POOL_TIMEOUT_SECS))
        .max_lifetime(Duration::from_secs(POOL_RECYCLE_SECS))
        .connect(&config.url())
        .await?;
    sqlx::query("SELECT 1").fetch_one(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_in_code() {
        let config = DbConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "ppds");
        assert_eq!(config.url(), "postgres://postgres:@127.0.0.1:5432/ppds");
    }

    #[test]
    fn pool_tuning_values() {
        assert_eq!(POOL_SIZE + MAX_OVERFLOW, 15);
        assert_eq!(POOL_TIMEOUT_SECS, 10);
        assert_eq!(POOL_RECYCLE_SECS, 600);
    }
}

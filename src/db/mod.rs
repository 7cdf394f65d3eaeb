//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool and enforce the
//! schema migrations before the HTTP listener accepts traffic. Pool sizing
//! and acquire timeout are env-tunable; request handlers hold connections
//! only for short CRUD statements, so the acquire timeout doubles as a
//! backpressure signal when the pool is exhausted.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// Honors `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections = env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
    let acquire_timeout_secs = env_parse("DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_DB_ACQUIRE_TIMEOUT_SECS);
    tracing::info!(max_connections, acquire_timeout_secs, "database pool configured");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_when_var_missing() {
        assert_eq!(env_parse("MASTERKIDS_UNSET_U32_KNOB", 10_u32), 10);
        assert_eq!(env_parse("MASTERKIDS_UNSET_U64_KNOB", 5_u64), 5);
    }

    #[test]
    fn env_parse_defaults_match_pool_constants() {
        assert_eq!(DEFAULT_DB_MAX_CONNECTIONS, 10);
        assert_eq!(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS, 5);
    }
}

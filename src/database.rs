use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, PgPool};
use std::str::FromStr;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url)?
        .application_name("luxride-backend")
        .statement_cache_capacity(200);

    PgPoolOptions::new()
        .max_connections(16)
        .min_connections(4)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .idle_timeout(std::time::Duration::from_secs(30))
        .connect_with(options)
        .await
}

//! Application state for restaurant-server

use shared::ServiceHours;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Bookable window used by reservation validation
    pub hours: ServiceHours,
}

impl AppState {
    /// Connect to PostgreSQL and run pending migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config.hours))
    }

    /// Build state around an existing pool (no connection is made)
    pub fn with_pool(pool: PgPool, hours: ServiceHours) -> Self {
        Self { pool, hours }
    }
}

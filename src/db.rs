use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

pub type DbPool = SqlitePool;

/// Initialize the database connection pool and run migrations
///
/// Migrations use `CREATE TABLE IF NOT EXISTS`, so pointing this at an
/// existing `bike_activities.db` is safe.
pub async fn initialize_db(database_url: &str) -> Result<DbPool, AppError> {
  tracing::info!(url = database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

//! Record store: inserts and recency queries for rides and maintenance.
//!
//! All operations are independent appends or reads; nothing here holds
//! state beyond the pool.

use crate::db::DbPool;
use crate::models::{MaintenanceSummary, NewMaintenance, NewRide, RideSummary};

pub type RecordId = i64;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Failed to insert {table} row: {source}")]
  Insert {
    table: &'static str,
    #[source]
    source: sqlx::Error,
  },

  #[error("Failed to query {table}: {source}")]
  Query {
    table: &'static str,
    #[source]
    source: sqlx::Error,
  },
}

// ---------------------------------------------------------------------------
// Rides
// ---------------------------------------------------------------------------

/// Insert a completed ride, returning its row id
pub async fn insert_ride(pool: &DbPool, ride: &NewRide) -> Result<RecordId, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO rides (date, distance, avg_speed, max_speed, avg_pulse, max_pulse, duration, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
  )
  .bind(ride.date)
  .bind(ride.distance)
  .bind(ride.avg_speed)
  .bind(ride.max_speed)
  .bind(ride.avg_pulse)
  .bind(ride.max_pulse)
  .bind(&ride.duration)
  .bind(&ride.notes)
  .execute(pool)
  .await
  .map_err(|source| StoreError::Insert {
    table: "rides",
    source,
  })?;

  Ok(result.last_insert_rowid())
}

/// Most recently inserted rides first, at most `limit` rows
pub async fn recent_rides(pool: &DbPool, limit: i64) -> Result<Vec<RideSummary>, StoreError> {
  sqlx::query_as::<_, RideSummary>(
    r#"
    SELECT date, distance, avg_speed, duration
    FROM rides
    ORDER BY created_at DESC, id DESC
    LIMIT ?1
    "#,
  )
  .bind(limit)
  .fetch_all(pool)
  .await
  .map_err(|source| StoreError::Query {
    table: "rides",
    source,
  })
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

pub async fn insert_maintenance(
  pool: &DbPool,
  entry: &NewMaintenance,
) -> Result<RecordId, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO maintenance (date, activity_type, notes)
    VALUES (?1, ?2, ?3)
    "#,
  )
  .bind(entry.date)
  .bind(&entry.activity_type)
  .bind(&entry.notes)
  .execute(pool)
  .await
  .map_err(|source| StoreError::Insert {
    table: "maintenance",
    source,
  })?;

  Ok(result.last_insert_rowid())
}

pub async fn recent_maintenance(
  pool: &DbPool,
  limit: i64,
) -> Result<Vec<MaintenanceSummary>, StoreError> {
  sqlx::query_as::<_, MaintenanceSummary>(
    r#"
    SELECT date, activity_type, notes
    FROM maintenance
    ORDER BY created_at DESC, id DESC
    LIMIT ?1
    "#,
  )
  .bind(limit)
  .fetch_all(pool)
  .await
  .map_err(|source| StoreError::Query {
    table: "maintenance",
    source,
  })
}

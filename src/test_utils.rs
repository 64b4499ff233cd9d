//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock record factories
//! - Row fetchers for asserting on persisted data

use crate::models::{MaintenanceRecord, NewRide, RideRecord};
use crate::store::insert_ride;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the database with rides of distance 10, 11, 12, ... in insertion order
/// Returns the IDs of created rides
pub async fn seed_test_rides(pool: &SqlitePool, count: usize) -> Vec<i64> {
  let mut ride_ids = Vec::new();

  for i in 0..count {
    let ride = NewRide {
      avg_speed: Some(20.0 + i as f64),
      duration: Some(format!("{} minutes", 60 + i)),
      ..mock_new_ride(10.0 + i as f64)
    };

    let id = insert_ride(pool, &ride)
      .await
      .expect("Failed to insert test ride");
    ride_ids.push(id);
  }

  ride_ids
}

/// All rides, in insertion order
pub async fn fetch_rides(pool: &SqlitePool) -> Vec<RideRecord> {
  sqlx::query_as::<_, RideRecord>("SELECT * FROM rides ORDER BY id")
    .fetch_all(pool)
    .await
    .expect("Failed to fetch rides")
}

/// All maintenance rows, in insertion order
pub async fn fetch_maintenance(pool: &SqlitePool) -> Vec<MaintenanceRecord> {
  sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenance ORDER BY id")
    .fetch_all(pool)
    .await
    .expect("Failed to fetch maintenance")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A ride with only the required distance set
pub fn mock_new_ride(distance: f64) -> NewRide {
  NewRide {
    date: test_date(),
    distance,
    avg_speed: None,
    max_speed: None,
    avg_pulse: None,
    max_pulse: None,
    duration: None,
    notes: None,
  }
}

/// Fixed date for tests that don't care about "today"
pub fn test_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 6, 14).expect("valid date")
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('rides', 'maintenance')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected 2 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_rides_returns_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_test_rides(&pool, 5).await;
    assert_eq!(ids.len(), 5);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rides")
      .fetch_one(&pool)
      .await
      .expect("Failed to count rides");

    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }
}

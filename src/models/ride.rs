use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RideRecord {
  pub id: i64,
  pub date: NaiveDate,
  pub distance: f64,
  pub avg_speed: Option<f64>,
  pub max_speed: Option<f64>,
  pub avg_pulse: Option<i64>,
  pub max_pulse: Option<i64>,
  pub duration: Option<String>,
  pub notes: Option<String>,
  pub created_at: Option<NaiveDateTime>,
}

/// For inserting new rides (without id, created_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRide {
  pub date: NaiveDate,
  pub distance: f64,
  pub avg_speed: Option<f64>,
  pub max_speed: Option<f64>,
  pub avg_pulse: Option<i64>,
  pub max_pulse: Option<i64>,
  pub duration: Option<String>,
  pub notes: Option<String>,
}

/// Row shape of the "recent rides" listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RideSummary {
  pub date: NaiveDate,
  pub distance: f64,
  pub avg_speed: Option<f64>,
  pub duration: Option<String>,
}

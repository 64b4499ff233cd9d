use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceRecord {
  pub id: i64,
  pub date: NaiveDate,
  pub activity_type: String,
  pub notes: Option<String>,
  pub created_at: Option<NaiveDateTime>,
}

/// For inserting new maintenance events (without id, created_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenance {
  pub date: NaiveDate,
  pub activity_type: String,
  pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceSummary {
  pub date: NaiveDate,
  pub activity_type: String,
  pub notes: Option<String>,
}

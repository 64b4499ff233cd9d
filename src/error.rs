//! Error types shared across the bot.
//!
//! `TurnError` covers everything that can go wrong inside a single chat turn
//! and is always turned into a reply for that chat. `AppError` covers startup
//! failures, which are fatal.

use crate::catalog::RideField;
use crate::config::ConfigError;
use crate::store::StoreError;
use crate::telegram::TelegramError;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
  #[error("Invalid input for {}", .field.label())]
  InvalidInput { field: RideField },

  #[error("Required field missing: {}", .0.key())]
  MissingRequiredField(RideField),

  #[error("Unrecognized action: {0}")]
  UnrecognizedAction(String),

  #[error("Failed to save record: {0}")]
  StoreWriteFailure(StoreError),

  #[error("Failed to load records: {0}")]
  StoreReadFailure(StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Telegram error: {0}")]
  Telegram(#[from] TelegramError),
}

//! Runtime configuration loaded from environment variables.
//!
//! `run()` loads a `.env` file first, so everything here can also be set
//! there. Only the bot token is required.

use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://bike_activities.db?mode=rwc";
const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECENT_LIMIT: i64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
  /// Telegram bot credential
  pub telegram_bot_token: String,
  /// Bot API base URL, overridable for local testing
  pub telegram_api_base: String,
  pub database_url: String,
  /// Long-poll timeout passed to getUpdates
  pub poll_timeout_secs: u64,
  /// Number of rows shown by the "view" menu actions
  pub recent_limit: i64,
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
      .map(|v| v.trim().to_string())
      .ok()
      .filter(|v| !v.is_empty())
      .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

    // SQLite treats a negative LIMIT as unbounded
    let recent_limit: i64 = parse_var("RECENT_LIMIT", DEFAULT_RECENT_LIMIT)?;
    if recent_limit < 1 {
      return Err(ConfigError::Invalid {
        name: "RECENT_LIMIT",
        value: recent_limit.to_string(),
      });
    }

    Ok(Self {
      telegram_bot_token,
      telegram_api_base: env::var("TELEGRAM_API_BASE")
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
      database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
      poll_timeout_secs: parse_var("POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?,
      recent_limit,
    })
  }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|_| ConfigError::Invalid { name, value: raw }),
    Err(_) => Ok(default),
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing required environment variable: {0}")]
  Missing(&'static str),

  #[error("Invalid value for {name}: {value:?}")]
  Invalid { name: &'static str, value: String },
}

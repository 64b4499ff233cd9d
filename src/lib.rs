pub mod bot;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod presentation;
pub mod session;
pub mod store;
pub mod telegram;
pub mod wizard;

#[cfg(test)]
mod test_utils;

use config::Config;
use error::AppError;
use session::SessionController;
use telegram::TelegramClient;

/// Default filter when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "info,bike_log=debug";

pub async fn run() -> Result<(), AppError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  init_logging();

  let config = Config::from_env()?;
  tracing::info!(database = %config.database_url, "Starting bike log bot");

  let db = db::initialize_db(&config.database_url).await?;

  let client = TelegramClient::new(
    &config.telegram_api_base,
    &config.telegram_bot_token,
    config.poll_timeout_secs,
  )?;
  let me = client.get_me().await?;
  tracing::info!(
    bot = me.username.as_deref().unwrap_or(&me.first_name),
    "Connected to Telegram"
  );

  let mut controller = SessionController::new(db.clone(), config.recent_limit);
  bot::run_polling(&client, &mut controller, config.poll_timeout_secs).await;

  db.close().await;
  tracing::info!("Bot stopped");
  Ok(())
}

fn init_logging() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

  // A second init (tests, embedding) keeps the existing subscriber
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .try_init();
}

//! Telegram Bot API client
//!
//! Only the handful of methods the bot needs: getMe, getUpdates (long
//! polling) and sendMessage with a reply keyboard.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::presentation::{Keyboard, Reply};

/// Extra time on top of the long-poll timeout before the HTTP request gives up
const REQUEST_GRACE_SECS: u64 = 10;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Invalid API URL: {0}")]
  Url(#[from] url::ParseError),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Bot API Types
/// ---------------------------------------------------------------------------

/// Every Bot API response is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
  ok: bool,
  result: Option<T>,
  description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
  pub update_id: i64,
  #[serde(default)]
  pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
  pub chat: Chat,
  #[serde(default)]
  pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
  pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub id: i64,
  pub first_name: String,
  #[serde(default)]
  pub username: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  offset: Option<i64>,
  timeout: u64,
  allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
  chat_id: i64,
  text: &'a str,
  reply_markup: ReplyMarkup,
}

#[derive(Debug, Serialize)]
struct KeyboardButton {
  text: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReplyMarkup {
  Keyboard {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
  },
  Remove {
    remove_keyboard: bool,
  },
}

impl From<&Keyboard> for ReplyMarkup {
  fn from(keyboard: &Keyboard) -> Self {
    match keyboard {
      Keyboard::Menu(rows) => ReplyMarkup::Keyboard {
        keyboard: rows
          .iter()
          .map(|row| {
            row
              .iter()
              .map(|text| KeyboardButton { text: text.clone() })
              .collect()
          })
          .collect(),
        resize_keyboard: true,
      },
      Keyboard::Remove => ReplyMarkup::Remove {
        remove_keyboard: true,
      },
    }
  }
}

/// ---------------------------------------------------------------------------
/// Telegram Client
/// ---------------------------------------------------------------------------

pub struct TelegramClient {
  client: Client,
  api_base: String,
  token: String,
}

impl TelegramClient {
  pub fn new(api_base: &str, token: &str, poll_timeout_secs: u64) -> Result<Self, TelegramError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(poll_timeout_secs + REQUEST_GRACE_SECS))
      .build()?;

    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
      token: token.to_string(),
    })
  }

  fn method_url(&self, method: &str) -> Result<Url, TelegramError> {
    Ok(Url::parse(&format!(
      "{}/bot{}/{}",
      self.api_base, self.token, method
    ))?)
  }

  /// POST a JSON body to a Bot API method and unwrap the response envelope
  async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let response = self
      .client
      .post(self.method_url(method)?)
      .json(body)
      .send()
      .await?;

    let status = response.status();
    let text = response.text().await?;

    let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
      if status.is_success() {
        TelegramError::Parse(format!("{}: {}", method, e))
      } else {
        TelegramError::Api(format!("HTTP {}: {}", status, text))
      }
    })?;

    if !envelope.ok {
      return Err(TelegramError::Api(
        envelope
          .description
          .unwrap_or_else(|| format!("HTTP {}", status)),
      ));
    }

    envelope
      .result
      .ok_or_else(|| TelegramError::Parse(format!("{}: missing result", method)))
  }

  /// Verify the token and return the bot's own user
  pub async fn get_me(&self) -> Result<User, TelegramError> {
    self.call("getMe", &serde_json::json!({})).await
  }

  /// Long-poll for message updates after `offset`
  pub async fn get_updates(
    &self,
    offset: Option<i64>,
    timeout_secs: u64,
  ) -> Result<Vec<Update>, TelegramError> {
    let request = GetUpdatesRequest {
      offset,
      timeout: timeout_secs,
      allowed_updates: vec!["message"],
    };
    self.call("getUpdates", &request).await
  }

  pub async fn send_message(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
    let request = SendMessageRequest {
      chat_id,
      text: &reply.text,
      reply_markup: ReplyMarkup::from(&reply.keyboard),
    };
    let _sent: Message = self.call("sendMessage", &request).await?;
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

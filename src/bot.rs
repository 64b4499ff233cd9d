//! Long-polling loop: pulls updates from Telegram, routes them through the
//! session controller and sends the replies back.

use std::future::Future;
use std::time::Duration;

use crate::presentation::Reply;
use crate::session::SessionController;
use crate::telegram::{Message, TelegramClient, TelegramError, Update};

/// Wait before polling again after a failed getUpdates
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Start,
  Cancel,
  Other(String),
}

/// Parse a slash command, tolerating the `/cmd@botname` form used in groups
pub fn parse_command(text: &str) -> Option<Command> {
  let word = text.trim().split_whitespace().next()?;
  let name = word.strip_prefix('/')?;
  let name = name.split('@').next().unwrap_or(name);

  Some(match name {
    "start" => Command::Start,
    "cancel" => Command::Cancel,
    other => Command::Other(other.to_string()),
  })
}

/// Route one message. Non-text messages and unknown commands get no reply.
pub async fn dispatch(controller: &mut SessionController, message: &Message) -> Option<Reply> {
  let text = message.text.as_deref()?;
  let chat_id = message.chat.id;

  match parse_command(text) {
    Some(Command::Start) => Some(controller.start(chat_id)),
    Some(Command::Cancel) => Some(controller.cancel(chat_id)),
    Some(Command::Other(name)) => {
      tracing::debug!(chat = chat_id, command = %name, "Ignoring unknown command");
      None
    }
    None => Some(controller.handle_turn(chat_id, text).await),
  }
}

/// Fetch one batch of updates, handle them in order and return the offset
/// for the next poll.
pub async fn poll_once(
  client: &TelegramClient,
  controller: &mut SessionController,
  offset: Option<i64>,
  timeout_secs: u64,
) -> Result<Option<i64>, TelegramError> {
  let updates = client.get_updates(offset, timeout_secs).await?;
  Ok(handle_updates(client, controller, offset, updates).await)
}

async fn handle_updates(
  client: &TelegramClient,
  controller: &mut SessionController,
  offset: Option<i64>,
  updates: Vec<Update>,
) -> Option<i64> {
  let mut next_offset = offset;

  for update in updates {
    next_offset = Some(update.update_id + 1);

    let Some(message) = update.message else {
      continue;
    };
    let Some(reply) = dispatch(controller, &message).await else {
      continue;
    };

    if let Err(e) = client.send_message(message.chat.id, &reply).await {
      tracing::warn!(chat = message.chat.id, error = %e, "Failed to send reply");
    }
  }

  next_offset
}

/// Poll until Ctrl-C. Fetch errors are logged and retried.
pub async fn run_polling(
  client: &TelegramClient,
  controller: &mut SessionController,
  timeout_secs: u64,
) {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };
  run_until(client, controller, timeout_secs, ctrl_c).await;
}

/// Poll until `shutdown` resolves.
///
/// Shutdown only interrupts a pending fetch or retry wait. A batch that has
/// been fetched is always handled to the end, and the final offset is
/// acknowledged so Telegram does not redeliver handled updates.
pub async fn run_until<F>(
  client: &TelegramClient,
  controller: &mut SessionController,
  timeout_secs: u64,
  shutdown: F,
) where
  F: Future<Output = ()>,
{
  tokio::pin!(shutdown);
  let mut offset = None;
  tracing::info!("Polling for updates");

  loop {
    let fetched = tokio::select! {
      biased;
      _ = &mut shutdown => break,
      result = client.get_updates(offset, timeout_secs) => result,
    };

    match fetched {
      Ok(updates) => offset = handle_updates(client, controller, offset, updates).await,
      Err(e) => {
        tracing::warn!(error = %e, "Polling failed, retrying");
        tokio::select! {
          biased;
          _ = &mut shutdown => break,
          _ = tokio::time::sleep(RETRY_DELAY) => {}
        }
      }
    }
  }

  tracing::info!("Shutdown requested");
  acknowledge(client, offset).await;
}

/// Confirm handled updates with a zero-timeout getUpdates
async fn acknowledge(client: &TelegramClient, offset: Option<i64>) {
  let Some(offset) = offset else {
    return;
  };
  if let Err(e) = client.get_updates(Some(offset), 0).await {
    tracing::warn!(offset, error = %e, "Failed to acknowledge updates");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::presentation::ADD_RIDE;
  use crate::telegram::Chat;
  use crate::test_utils::{fetch_maintenance, setup_test_db};
  use crate::wizard::ConversationState;
  use mockito::Matcher;
  use serde_json::json;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;

  fn message(chat_id: i64, text: Option<&str>) -> Message {
    Message {
      chat: Chat { id: chat_id },
      text: text.map(String::from),
    }
  }

  #[test]
  fn test_parse_command() {
    assert_eq!(parse_command("/start"), Some(Command::Start));
    assert_eq!(parse_command("  /cancel  "), Some(Command::Cancel));
    assert_eq!(parse_command("/start@bike_log_bot"), Some(Command::Start));
    assert_eq!(parse_command("/help me"), Some(Command::Other("help".into())));
    assert_eq!(parse_command("25.5"), None);
    assert_eq!(parse_command(ADD_RIDE), None);
  }

  #[tokio::test]
  async fn test_dispatch_routes_commands_and_text() {
    let mut controller = SessionController::new(setup_test_db().await, 5);

    let reply = dispatch(&mut controller, &message(1, Some("/start")))
      .await
      .expect("start should reply");
    assert!(reply.text.starts_with("Welcome"));

    dispatch(&mut controller, &message(1, Some(ADD_RIDE))).await;
    assert_eq!(
      controller.session(1).unwrap().state,
      ConversationState::AddingRideWizard
    );

    let reply = dispatch(&mut controller, &message(1, Some("/cancel")))
      .await
      .expect("cancel should reply");
    assert!(reply.text.starts_with("Operation cancelled"));
    assert_eq!(
      controller.session(1).unwrap().state,
      ConversationState::ChoosingAction
    );
  }

  #[tokio::test]
  async fn test_dispatch_ignores_non_text_and_unknown_commands() {
    let mut controller = SessionController::new(setup_test_db().await, 5);

    assert!(dispatch(&mut controller, &message(1, None)).await.is_none());
    assert!(dispatch(&mut controller, &message(1, Some("/help")))
      .await
      .is_none());
    assert!(controller.session(1).is_none());
  }

  #[tokio::test]
  async fn test_poll_once_replies_and_advances_offset() {
    let mut server = mockito::Server::new_async().await;
    let updates = server
      .mock("POST", "/bot123:TEST/getUpdates")
      .with_status(200)
      .with_body(
        r#"{"ok":true,"result":[
          {"update_id":40,"message":{"message_id":1,"chat":{"id":8},"date":0,"text":"/start"}},
          {"update_id":41,"edited_message":{"message_id":1,"chat":{"id":8},"date":0,"text":"x"}}
        ]}"#,
      )
      .create_async()
      .await;
    let send = server
      .mock("POST", "/bot123:TEST/sendMessage")
      .match_body(Matcher::PartialJson(json!({"chat_id": 8})))
      .with_status(200)
      .with_body(r#"{"ok":true,"result":{"message_id":2,"chat":{"id":8},"date":0}}"#)
      .expect(1)
      .create_async()
      .await;

    let client = TelegramClient::new(&server.url(), "123:TEST", 1).unwrap();
    let mut controller = SessionController::new(setup_test_db().await, 5);

    let offset = poll_once(&client, &mut controller, None, 1)
      .await
      .expect("poll should succeed");

    assert_eq!(offset, Some(42));
    updates.assert_async().await;
    send.assert_async().await;
  }

  #[tokio::test]
  async fn test_poll_once_survives_send_failure() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/bot123:TEST/getUpdates")
      .with_status(200)
      .with_body(
        r#"{"ok":true,"result":[{"update_id":5,"message":{"message_id":1,"chat":{"id":8},"date":0,"text":"/start"}}]}"#,
      )
      .create_async()
      .await;
    server
      .mock("POST", "/bot123:TEST/sendMessage")
      .with_status(403)
      .with_body(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#)
      .create_async()
      .await;

    let client = TelegramClient::new(&server.url(), "123:TEST", 1).unwrap();
    let mut controller = SessionController::new(setup_test_db().await, 5);

    let offset = poll_once(&client, &mut controller, Some(5), 1).await.unwrap();
    assert_eq!(offset, Some(6));
    assert!(controller.session(8).is_some());
  }

  #[tokio::test]
  async fn test_poll_once_empty_batch_keeps_offset() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/bot123:TEST/getUpdates")
      .with_status(200)
      .with_body(r#"{"ok":true,"result":[]}"#)
      .create_async()
      .await;

    let client = TelegramClient::new(&server.url(), "123:TEST", 1).unwrap();
    let mut controller = SessionController::new(setup_test_db().await, 5);

    let offset = poll_once(&client, &mut controller, Some(17), 1).await.unwrap();
    assert_eq!(offset, Some(17));
  }

  #[tokio::test]
  async fn test_shutdown_finishes_fetched_batch_and_acknowledges() {
    let mut server = mockito::Server::new_async().await;
    let batch = server
      .mock("POST", "/bot123:TEST/getUpdates")
      .match_body(Matcher::PartialJson(json!({"timeout": 1})))
      .with_status(200)
      .with_body(
        r#"{"ok":true,"result":[
          {"update_id":10,"message":{"message_id":1,"chat":{"id":8},"date":0,"text":"🔧 Add Maintenance"}},
          {"update_id":11,"message":{"message_id":2,"chat":{"id":8},"date":0,"text":"🔗 Chain Lubrication"}}
        ]}"#,
      )
      .expect(1)
      .create_async()
      .await;
    let ack = server
      .mock("POST", "/bot123:TEST/getUpdates")
      .match_body(Matcher::PartialJson(json!({"offset": 12, "timeout": 0})))
      .with_status(200)
      .with_body(r#"{"ok":true,"result":[]}"#)
      .expect(1)
      .create_async()
      .await;

    // Request shutdown as soon as the first reply of the batch goes out
    let replied = Arc::new(AtomicBool::new(false));
    let flag = replied.clone();
    let send = server
      .mock("POST", "/bot123:TEST/sendMessage")
      .with_status(200)
      .with_body_from_request(move |_| {
        flag.store(true, Ordering::SeqCst);
        br#"{"ok":true,"result":{"message_id":3,"chat":{"id":8},"date":0}}"#.to_vec()
      })
      .expect(2)
      .create_async()
      .await;

    let client = TelegramClient::new(&server.url(), "123:TEST", 1).unwrap();
    let db = setup_test_db().await;
    let mut controller = SessionController::new(db.clone(), 5);

    let shutdown = async move {
      while !replied.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
      }
    };
    run_until(&client, &mut controller, 1, shutdown).await;

    let entries = fetch_maintenance(&db).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].activity_type, "Chain Lubrication");
    assert_eq!(
      controller.session(8).unwrap().state,
      ConversationState::ChoosingAction
    );
    batch.assert_async().await;
    send.assert_async().await;
    ack.assert_async().await;
  }

  #[tokio::test]
  async fn test_shutdown_interrupts_retry_wait() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/bot123:TEST/getUpdates")
      .with_status(502)
      .with_body("Bad Gateway")
      .create_async()
      .await;

    let client = TelegramClient::new(&server.url(), "123:TEST", 1).unwrap();
    let mut controller = SessionController::new(setup_test_db().await, 5);

    let shutdown = tokio::time::sleep(Duration::from_millis(200));
    let finished = tokio::time::timeout(
      Duration::from_secs(2),
      run_until(&client, &mut controller, 1, shutdown),
    )
    .await;

    assert!(finished.is_ok(), "retry wait should not delay shutdown");
  }
}

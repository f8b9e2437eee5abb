use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use scheduler::{DisplayHandle, DisplaySink, SinkError};
use subscriber::SubscriberId;

use super::client::TelegramClient;

/// Callback data of the per-item exclusion button.
pub const EXCLUDE_PREFIX: &str = "exclude:";

/// Telegram caps callback data at 64 bytes.
const MAX_CALLBACK_DATA: usize = 64;

/// Inline keyboard with a single "Exclude" button for `identity`, or `None`
/// when the identity does not fit in callback data.
pub fn exclude_keyboard(identity: &str) -> Option<Value> {
    let data = format!("{EXCLUDE_PREFIX}{identity}");
    if data.len() > MAX_CALLBACK_DATA {
        return None;
    }
    Some(json!({
        "inline_keyboard": [[{ "text": "🚫 Exclude", "callback_data": data }]]
    }))
}

/// Subscribers are Telegram chats; handles are message ids.
pub struct TelegramSink {
    client: TelegramClient,
}

impl TelegramSink {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DisplaySink for TelegramSink {
    async fn create(
        &self,
        subscriber_id: SubscriberId,
        identity: &str,
        text: &str,
    ) -> Result<DisplayHandle, SinkError> {
        let message_id = self
            .client
            .send_message(subscriber_id, text, exclude_keyboard(identity))
            .await?;
        Ok(DisplayHandle(message_id))
    }

    async fn update(
        &self,
        subscriber_id: SubscriberId,
        handle: DisplayHandle,
        identity: &str,
        text: &str,
    ) -> Result<(), SinkError> {
        match self
            .client
            .edit_message_text(subscriber_id, handle.0, text, exclude_keyboard(identity))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_modified() => {
                debug!(subscriber_id, %handle, "edit was a no-op");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, subscriber_id: SubscriberId, handle: DisplayHandle) -> Result<(), SinkError> {
        self.client.delete_message(subscriber_id, handle.0).await?;
        Ok(())
    }
}

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::types::{ApiResponse, Message, Update};
use crate::errors::TelegramError;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Seconds a `getUpdates` call may be held open by the server.
const LONG_POLL_SECS: u64 = 25;

/// Thin Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,

    /// `<api_url>/bot<token>`
    base: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let http = Client::builder()
            // Must outlive the long poll.
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// POST `method` and unwrap the Bot API envelope.
    ///
    /// Error replies come with a 4xx status and a JSON body; the body is
    /// what carries the reason, so the status is not checked first.
    async fn call<T: DeserializeOwned>(&self, method: &'static str, payload: Value) -> Result<T, TelegramError> {
        let resp = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(&payload)
            .send()
            .await?;

        let body: ApiResponse<T> = resp.json().await?;
        if !body.ok {
            return Err(TelegramError::Api {
                code: body.error_code,
                description: body.description.unwrap_or_default(),
            });
        }
        body.result.ok_or(TelegramError::MissingResult(method))
    }

    #[instrument(skip(self, text, reply_markup), level = "debug")]
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<Value>,
    ) -> Result<i64, TelegramError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = markup;
        }

        let msg: Message = self.call("sendMessage", payload).await?;
        debug!(message_id = msg.message_id, "message sent");
        Ok(msg.message_id)
    }

    #[instrument(skip(self, text, reply_markup), level = "debug")]
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<Value>,
    ) -> Result<(), TelegramError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = markup;
        }

        // Result is the edited message, or `true` for inline messages.
        let _: Value = self.call("editMessageText", payload).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_query_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": LONG_POLL_SECS,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

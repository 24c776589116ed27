//! Telegram Bot API sink.
//!
//! Posts to a single chat via `sendMessage` and retracts status messages
//! via `deleteMessage`. Both calls run under the client timeout so a stalled
//! API cannot hold up the poll loop. `getUpdates` is long-polled separately
//! by the command listener with its own, longer request timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{MessageId, Notifier};

const API_BASE: &str = "https://api.telegram.org";
const SINK_NAME: &str = "telegram";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest<'a> {
    chat_id: &'a str,
    message_id: MessageId,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Envelope every Bot API method returns. `result` is absent on failure.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

/// One incoming update from `getUpdates`. Only chat messages are requested.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            anyhow::bail!(
                "Telegram {method} failed: {}",
                self.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        self.result
            .with_context(|| format!("Telegram {method} returned no result"))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            http,
            bot_token,
            chat_id,
            timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.bot_token)
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Telegram {method} request failed"))?;

        let parsed: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram {method} response"))?;

        parsed.into_result(method)
    }

    /// Long-poll for new messages starting at `offset`. The server holds
    /// the request open for up to `wait`.
    pub async fn get_updates(&self, offset: i64, wait: Duration) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: wait.as_secs(),
                allowed_updates: ["message"],
            },
            wait + self.timeout,
        )
        .await
    }

    /// Answer in the chat a command came from, which need not be the
    /// signal channel.
    pub async fn reply(&self, chat_id: i64, text: &str) -> Result<MessageId> {
        let chat_id = chat_id.to_string();
        let sent: SentMessage = self
            .call(
                "sendMessage",
                &SendMessageRequest {
                    chat_id: &chat_id,
                    text,
                },
                self.timeout,
            )
            .await?;
        Ok(sent.message_id)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<MessageId> {
        let sent: SentMessage = self
            .call(
                "sendMessage",
                &SendMessageRequest {
                    chat_id: &self.chat_id,
                    text,
                },
                self.timeout,
            )
            .await?;
        debug!(message_id = sent.message_id, "Telegram message sent");
        Ok(sent.message_id)
    }

    async fn retract(&self, id: MessageId) -> Result<()> {
        let _deleted: bool = self
            .call(
                "deleteMessage",
                &DeleteMessageRequest {
                    chat_id: &self.chat_id,
                    message_id: id,
                },
                self.timeout,
            )
            .await?;
        debug!(message_id = id, "Telegram message deleted");
        Ok(())
    }

    fn name(&self) -> &str {
        SINK_NAME
    }
}

//! Notification sinks.

use async_trait::async_trait;
use tracing::{debug, info};

use upwatch_config::TelegramConfig;

use crate::error::MonitorError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// How a message body should be interpreted by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Telegram-flavored HTML. Dynamic content must be escaped.
    Html,
    /// Plain text, used for last-resort error reporting.
    Plain,
}

/// Outbound notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, text: &str, format: MessageFormat) -> Result<(), MonitorError>;
}

/// Telegram Bot API sink.
pub struct TelegramSink {
    api_base: String,
    bot_token: String,
    chat_id: String,
    thread_id: Option<i64>,
    client: reqwest::Client,
}

impl TelegramSink {
    /// Create a new sink.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            thread_id: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create a sink from Telegram configuration, if credentials are present.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, MonitorError> {
        if !config.is_configured() {
            return Err(MonitorError::SinkNotConfigured(
                "telegram bot_token/chat_id missing".to_string(),
            ));
        }
        let mut sink = Self::new(
            config.bot_token.clone().unwrap_or_default(),
            config.chat_id.clone().unwrap_or_default(),
        );
        sink.thread_id = config.thread_id;
        Ok(sink)
    }

    /// Target a forum topic / thread within the chat.
    pub fn with_thread_id(mut self, thread_id: i64) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str, format: MessageFormat) -> Result<(), MonitorError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let mut payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if format == MessageFormat::Html {
            payload["parse_mode"] = serde_json::json!("HTML");
        }
        if let Some(thread_id) = self.thread_id {
            payload["message_thread_id"] = serde_json::json!(thread_id);
        }

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::Notification(format!("Telegram request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("Telegram message sent");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(MonitorError::Notification(format!(
                "Telegram API returned {}: {}",
                status, body
            )))
        }
    }
}

/// Log-only sink, used when no chat channel is configured.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str, _format: MessageFormat) -> Result<(), MonitorError> {
        info!("NOTIFICATION: {}", text);
        Ok(())
    }
}

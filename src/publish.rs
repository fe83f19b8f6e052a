// src/publish.rs
//! Telegram publisher: channel posts and best-effort admin alerts.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Error, Result};

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send the finished post to the channel. With image bytes present it
    /// goes out as a captioned photo, otherwise as text with the link
    /// preview suppressed.
    async fn publish(&self, body: &str, image: Option<&[u8]>) -> Result<()>;

    /// Best-effort operational alert. Disabled silently when no admin chat
    /// is configured; a send failure is logged and swallowed.
    async fn notify_admin(&self, text: &str);
}

pub struct TelegramPublisher {
    client: reqwest::Client,
    bot_token: String,
    channel: String,
    admin_id: Option<i64>,
}

impl TelegramPublisher {
    pub fn new(bot_token: String, channel: String, admin_id: Option<i64>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("kaznews-bot/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            client,
            bot_token,
            channel,
            admin_id,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    async fn send_text(&self, body: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": self.channel,
                "text": body,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .map_err(|e| Error::Publish(format!("sendMessage: {e}")))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("sendMessage: {error_text}")));
        }
        Ok(())
    }

    async fn send_photo(&self, caption: &str, photo: &[u8]) -> Result<()> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.channel.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part(
                "photo",
                reqwest::multipart::Part::bytes(photo.to_vec()).file_name("photo.jpg"),
            );

        let resp = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("sendPhoto: {e}")))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("sendPhoto: {error_text}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, body: &str, image: Option<&[u8]>) -> Result<()> {
        match image {
            Some(bytes) => self.send_photo(body, bytes).await,
            None => self.send_text(body).await,
        }
    }

    async fn notify_admin(&self, text: &str) {
        let Some(admin_id) = self.admin_id else {
            tracing::debug!("admin alerts disabled (no ADMIN_ID)");
            return;
        };

        let result = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": admin_id,
                "text": format!("⚠️ kaznews-bot: {text}"),
            }))
            .send()
            .await;

        match result {
            Ok(resp) if !resp.status().is_success() => {
                let error_text = resp.text().await.unwrap_or_default();
                tracing::error!(error = %error_text, "admin alert rejected");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "admin alert send failed"),
        }
    }
}

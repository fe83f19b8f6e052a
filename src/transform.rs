// src/transform.rs
//! Content transformer: rewrites a raw summary into a channel post via the
//! Together chat-completions API, and fetches candidate image bytes.
//!
//! A failed rewrite is `Error::Transform` and abandons the current entry.
//! A failed image download is only a warning — the post goes out as text.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const COMPLETIONS_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// Editor persona for the channel.
const SYSTEM_PROMPT: &str = "Ты — редактор казахстанского Telegram-канала. \
Создай краткий и красиво оформленный пост на основе новости. \
Пиши только о событиях, произошедших в Казахстане. Игнорируй другие страны. \
Укажи дату и локацию, если они есть. Не вставляй ссылки. Стиль — новостной. \
В конце добавь хештег #Казахстан.";

#[async_trait]
pub trait Transformer: Send + Sync {
    /// Rewrite a cleaned summary into the post body.
    async fn rewrite(&self, summary: &str) -> Result<String>;

    /// Fetch image bytes; `None` on any non-2xx or network failure.
    async fn fetch_image_bytes(&self, url: &str) -> Option<Vec<u8>>;
}

pub struct TogetherRewriter {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

impl TogetherRewriter {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("kaznews-bot/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Transformer for TogetherRewriter {
    async fn rewrite(&self, summary: &str) -> Result<String> {
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: summary,
                },
            ],
            temperature: 0.7,
            max_tokens: 512,
        };

        let resp = self
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Transform(format!("completion request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transform(format!(
                "completion service returned {status}: {body}"
            )));
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| Error::Transform(format!("malformed completion response: {e}")))?;
        let text = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Transform("completion response had no choices".into()))?;
        Ok(text)
    }

    async fn fetch_image_bytes(&self, url: &str) -> Option<Vec<u8>> {
        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = ?e, url, "image download failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), url, "image download non-2xx");
            return None;
        }
        match resp.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!(error = ?e, url, "image body read failed");
                None
            }
        }
    }
}

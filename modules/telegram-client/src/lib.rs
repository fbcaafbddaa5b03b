pub mod error;
pub mod types;

pub use error::{Result, TelegramError};
pub use types::{ApiResponse, Message, ParseMode};

use std::time::Duration;

use serde_json::json;

const BASE_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Deliver a text message to a chat.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<Message> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": parse_mode.as_str(),
            "disable_web_page_preview": false,
        });
        self.call("sendMessage", payload).await
    }

    /// Deliver a photo by URL with a caption. Telegram fetches the URL
    /// server-side; an unreachable or malformed image comes back as a 400.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        parse_mode: ParseMode,
    ) -> Result<Message> {
        let payload = json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
            "parse_mode": parse_mode.as_str(),
        });
        self.call("sendPhoto", payload).await
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> Result<Message> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);

        let resp = self.client.post(&url).json(&payload).send().await.map_err(|e| {
            if e.is_timeout() {
                TelegramError::Timeout
            } else {
                TelegramError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                TelegramError::Timeout
            } else {
                TelegramError::Network(e.to_string())
            }
        })?;

        let parsed: ApiResponse<Message> =
            serde_json::from_str(&body).map_err(|e| TelegramError::Parse(e.to_string()))?;

        if parsed.ok {
            parsed
                .result
                .ok_or_else(|| TelegramError::Parse("ok response without result".to_string()))
        } else {
            let code = parsed.error_code.unwrap_or(status.as_u16());
            let description = parsed.description.unwrap_or_default();
            tracing::debug!(method, code, %description, "Bot API call rejected");
            Err(TelegramError::Api { code, description })
        }
    }
}

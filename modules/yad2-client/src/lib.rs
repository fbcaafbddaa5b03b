pub mod error;
pub mod types;

pub use error::{Result, Yad2Error};
pub use types::{Coordinates, FeedItem, SearchResponse};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

const DEFAULT_BASE_URL: &str = "https://gw.yad2.co.il";

/// Per-request timeout. The run-level deadline is enforced by the caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Total attempts per search, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// The bot manager serves an HTML challenge with a 200 status; this marker
/// is the only reliable way to tell it apart from the feed.
const CAPTCHA_MARKER: &str = "Radware Bot Manager Captcha";

pub struct Yad2Client {
    client: reqwest::Client,
    base_url: String,
}

impl Yad2Client {
    pub fn new(base_url: Option<&str>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            ),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("he-IL,he;q=0.9,en-US;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Fetch the current rental feed page for a city. Retries network,
    /// timeout and 5xx failures up to three attempts with exponential
    /// backoff; 4xx, captcha and parse failures return immediately.
    pub async fn search_rentals(&self, city_code: i32) -> Result<Vec<FeedItem>> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.search_once(city_code).await {
                Ok(items) => return Ok(items),
                Err(e) if e.retryable() && attempt < MAX_ATTEMPTS => {
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(
                        city_code,
                        attempt,
                        error = %e,
                        backoff_secs = backoff.as_secs(),
                        "Feed request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn search_once(&self, city_code: i32) -> Result<Vec<FeedItem>> {
        let url = format!(
            "{}/feed-search-legacy/realestate/rent?city={}&forceLdLoad=true",
            self.base_url, city_code
        );

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                Yad2Error::Timeout
            } else {
                Yad2Error::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                Yad2Error::Timeout
            } else {
                Yad2Error::Network(e.to_string())
            }
        })?;

        if is_captcha(&body) {
            return Err(Yad2Error::Captcha);
        }
        if !status.is_success() {
            return Err(Yad2Error::Http {
                status: status.as_u16(),
                message: truncate(&body, 300),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| Yad2Error::Parse(e.to_string()))?;

        let items = parsed.data.feed.feed_items;
        tracing::debug!(city_code, count = items.len(), "Fetched rental feed page");
        Ok(items)
    }
}

/// Detect the bot-manager challenge page by its vendor marker.
pub fn is_captcha(body: &str) -> bool {
    body.contains(CAPTCHA_MARKER)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captcha_marker_detected() {
        let body = "<html><title>Radware Bot Manager Captcha</title></html>";
        assert!(is_captcha(body));
        assert!(!is_captcha("{\"data\":{\"feed\":{\"feed_items\":[]}}}"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "שלום עולם";
        let t = truncate(s, 5);
        assert!(t.len() <= 5);
        assert!(s.starts_with(&t));
    }
}

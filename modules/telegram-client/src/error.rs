use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Bot API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Failed to parse Bot API response: {0}")]
    Parse(String),
}

impl TelegramError {
    /// Retryable failures: rate limits, server-side errors, network
    /// trouble. A 400 (bad photo URL, invalid dimensions, oversized file,
    /// malformed markup) will fail identically on retry.
    pub fn retryable(&self) -> bool {
        match self {
            TelegramError::Network(_) | TelegramError::Timeout => true,
            TelegramError::Api { code, .. } => *code == 429 || *code >= 500,
            TelegramError::Parse(_) => false,
        }
    }

    /// Whether this failure points at the photo itself rather than the
    /// chat or the payload. Used to decide a text-only fallback.
    pub fn is_image_error(&self) -> bool {
        match self {
            TelegramError::Api { code: 400, description } => {
                let lower = description.to_lowercase();
                lower.contains("wrong file identifier")
                    || lower.contains("failed to get http url content")
                    || lower.contains("photo_invalid_dimensions")
                    || lower.contains("image_process_failed")
                    || lower.contains("wrong type of the web page content")
            }
            _ => false,
        }
    }
}

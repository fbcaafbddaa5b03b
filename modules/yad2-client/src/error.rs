use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Yad2Error>;

#[derive(Debug, Error)]
pub enum Yad2Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Bot-manager captcha page returned instead of feed")]
    Captcha,

    #[error("Failed to parse feed response: {0}")]
    Parse(String),
}

impl Yad2Error {
    /// Whether a retry can reasonably succeed: network hiccups, timeouts
    /// and server errors. Client errors, captcha pages and malformed
    /// payloads will fail the same way again.
    pub fn retryable(&self) -> bool {
        match self {
            Yad2Error::Network(_) | Yad2Error::Timeout => true,
            Yad2Error::Http { status, .. } => *status >= 500,
            Yad2Error::Captcha | Yad2Error::Parse(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Yad2Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Yad2Error::Network(_) => "network",
            Yad2Error::Timeout => "timeout",
            Yad2Error::Http { .. } => "http",
            Yad2Error::Captcha => "captcha",
            Yad2Error::Parse(_) => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(Yad2Error::Http {
            status: 503,
            message: String::new()
        }
        .retryable());
        assert!(Yad2Error::Timeout.retryable());
        assert!(Yad2Error::Network("reset".into()).retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!Yad2Error::Http {
            status: 404,
            message: String::new()
        }
        .retryable());
        assert!(!Yad2Error::Captcha.retryable());
        assert!(!Yad2Error::Parse("eof".into()).retryable());
    }
}

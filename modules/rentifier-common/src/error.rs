use thiserror::Error;

// --- Connector error taxonomy ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorErrorKind {
    Network,
    Http,
    Timeout,
    Parse,
    Captcha,
}

impl std::fmt::Display for ConnectorErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorErrorKind::Network => write!(f, "network"),
            ConnectorErrorKind::Http => write!(f, "http"),
            ConnectorErrorKind::Timeout => write!(f, "timeout"),
            ConnectorErrorKind::Parse => write!(f, "parse"),
            ConnectorErrorKind::Captcha => write!(f, "captcha"),
        }
    }
}

/// A tagged fetch failure surfaced by a connector.
///
/// `cursor`, when set, is the connector's updated state envelope (failure
/// counters, circuit-open time). The collector persists it verbatim on
/// failure; the positional parts of the envelope never move until a fetch
/// succeeds and its candidates are stored.
#[derive(Debug, Error)]
#[error("{kind} error from connector: {message}")]
pub struct ConnectorError {
    pub kind: ConnectorErrorKind,
    pub status: Option<u16>,
    pub retryable: bool,
    pub message: String,
    pub cursor: Option<String>,
}

impl ConnectorError {
    pub fn new(kind: ConnectorErrorKind, retryable: bool, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            retryable,
            message: message.into(),
            cursor: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_cursor(mut self, cursor: String) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_error_display_includes_kind() {
        let err = ConnectorError::new(ConnectorErrorKind::Captcha, false, "blocked");
        let text = err.to_string();
        assert!(text.contains("captcha"), "got: {text}");
        assert!(text.contains("blocked"));
    }

    #[test]
    fn builder_carries_status_and_cursor() {
        let err = ConnectorError::new(ConnectorErrorKind::Http, true, "bad gateway")
            .with_status(502)
            .with_cursor("{\"i\":1}".to_string());
        assert_eq!(err.status, Some(502));
        assert!(err.retryable);
        assert_eq!(err.cursor.as_deref(), Some("{\"i\":1}"));
    }
}
